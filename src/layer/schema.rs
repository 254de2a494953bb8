use std::fmt;

use ahash::AHashMap;

/// Storage type of a layer field.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
    Integer,
    Double,
    Text,
    Boolean,
    Date,
}

impl FieldType {
    /// Integer and floating-point fields can be redistributed.
    #[inline] pub fn is_numeric(self) -> bool { matches!(self, FieldType::Integer | FieldType::Double) }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Integer => "integer",
            FieldType::Double => "double",
            FieldType::Text => "text",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
        };
        f.write_str(name)
    }
}

/// A named, typed column of a layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: FieldType,
    pub length: Option<u8>,
    pub precision: Option<u8>,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self { name: name.into(), ty, length: None, precision: None }
    }

    /// Set display length and precision.
    pub fn with_format(mut self, length: u8, precision: u8) -> Self {
        self.length = Some(length);
        self.precision = Some(precision);
        self
    }
}

/// Ordered field list with name lookup.
#[derive(Clone, Debug, Default)]
pub struct Fields {
    fields: Vec<Field>,
    index: AHashMap<String, usize>, // field name -> position
}

impl Fields {
    pub fn new() -> Self { Self::default() }

    #[inline] pub fn len(&self) -> usize { self.fields.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.fields.is_empty() }

    #[inline] pub fn iter(&self) -> impl Iterator<Item = &Field> { self.fields.iter() }

    #[inline] pub fn get(&self, idx: usize) -> Option<&Field> { self.fields.get(idx) }

    /// Position of the field called `name`, if any.
    #[inline] pub fn index_of(&self, name: &str) -> Option<usize> { self.index.get(name).copied() }

    #[inline] pub fn field(&self, name: &str) -> Option<&Field> { self.index_of(name).map(|i| &self.fields[i]) }

    #[inline] pub fn contains(&self, name: &str) -> bool { self.index.contains_key(name) }

    /// Append a field. Returns `false` (and leaves the list untouched) when a
    /// field with the same name already exists.
    pub fn append(&mut self, field: Field) -> bool {
        if self.contains(&field.name) { return false }
        self.index.insert(field.name.clone(), self.fields.len());
        self.fields.push(field);
        true
    }

    /// Field names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> { self.fields.iter().map(|f| f.name.as_str()) }
}

impl FromIterator<Field> for Fields {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for field in iter { fields.append(field); }
        fields
    }
}

impl PartialEq for Fields {
    fn eq(&self, other: &Self) -> bool { self.fields == other.fields }
}
