use anyhow::Result;
use prorata::Layer;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::FieldsArgs) -> Result<()> {
    let layer = Layer::read(&args.layer)?;

    println!("Layer: {} ({} features)", layer.name(), layer.len());
    match layer.epsg() {
        Some(epsg) => println!("CRS: EPSG:{epsg}"),
        None => println!("CRS: unknown"),
    }

    println!("Fields:");
    for field in layer.fields().iter() {
        let marker = if field.ty.is_numeric() { " (numeric)" } else { "" };
        println!("  - {} [{}]{}", field.name, field.ty, marker);
    }
    Ok(())
}
