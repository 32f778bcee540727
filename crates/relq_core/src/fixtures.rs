//! Shared entity fixtures for unit tests.

use relq_driver::{ScalarKind, ScalarValue};

use crate::schema::{descriptor, Entity, EntityShape, FieldSpec, NavigationSpec};

/// Root fixture with one resolvable navigation (`Publisher`, via the
/// `publisher_id` column) and one unresolvable navigation (`Author`).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub pages: i64,
    pub price: f64,
    pub available: bool,
    pub publisher_id: i64,
}

impl Entity for Book {
    fn shape() -> EntityShape {
        EntityShape::new("Book")
            .field(FieldSpec::new("id", ScalarKind::Integer).key())
            .field(FieldSpec::new("title", ScalarKind::Text))
            .field(FieldSpec::new("pages", ScalarKind::Integer))
            .field(FieldSpec::new("price", ScalarKind::Real))
            .field(FieldSpec::new("available", ScalarKind::Bool))
            .field(FieldSpec::new("publisher_id", ScalarKind::Integer))
            .navigation(NavigationSpec::new("Publisher", descriptor::<Publisher>))
            .navigation(NavigationSpec::new("Author", descriptor::<Author>))
    }

    fn get(&self, field: &str) -> Option<ScalarValue> {
        match field {
            "id" => Some(self.id.into()),
            "title" => Some(self.title.as_str().into()),
            "pages" => Some(self.pages.into()),
            "price" => Some(self.price.into()),
            "available" => Some(self.available.into()),
            "publisher_id" => Some(self.publisher_id.into()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: ScalarValue) -> bool {
        match field {
            "id" => self.id = value.as_integer().unwrap_or_default(),
            "title" => self.title = value.as_text().unwrap_or_default().to_string(),
            "pages" => self.pages = value.as_integer().unwrap_or_default(),
            "price" => self.price = value.as_real().unwrap_or_default(),
            "available" => self.available = value.as_bool().unwrap_or_default(),
            "publisher_id" => self.publisher_id = value.as_integer().unwrap_or_default(),
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Publisher {
    pub id: i64,
    pub name: String,
}

impl Entity for Publisher {
    fn shape() -> EntityShape {
        EntityShape::new("Publisher")
            .field(FieldSpec::new("id", ScalarKind::Integer).key())
            .field(FieldSpec::new("name", ScalarKind::Text))
    }

    fn get(&self, field: &str) -> Option<ScalarValue> {
        match field {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.as_str().into()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: ScalarValue) -> bool {
        match field {
            "id" => self.id = value.as_integer().unwrap_or_default(),
            "name" => self.name = value.as_text().unwrap_or_default().to_string(),
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

impl Entity for Author {
    fn shape() -> EntityShape {
        EntityShape::new("Author")
            .field(FieldSpec::new("id", ScalarKind::Integer).key())
            .field(FieldSpec::new("name", ScalarKind::Text))
    }

    fn get(&self, field: &str) -> Option<ScalarValue> {
        match field {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.as_str().into()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: ScalarValue) -> bool {
        match field {
            "id" => self.id = value.as_integer().unwrap_or_default(),
            "name" => self.name = value.as_text().unwrap_or_default().to_string(),
            _ => return false,
        }
        true
    }
}

/// Composite-key fixture; never identity.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Shipment {
    pub order_id: i64,
    pub line_no: i64,
    pub qty: i64,
}

impl Entity for Shipment {
    fn shape() -> EntityShape {
        EntityShape::new("Shipment")
            .field(FieldSpec::new("order_id", ScalarKind::Integer).key())
            .field(FieldSpec::new("line_no", ScalarKind::Integer).key())
            .field(FieldSpec::new("qty", ScalarKind::Integer))
    }

    fn get(&self, field: &str) -> Option<ScalarValue> {
        match field {
            "order_id" => Some(self.order_id.into()),
            "line_no" => Some(self.line_no.into()),
            "qty" => Some(self.qty.into()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: ScalarValue) -> bool {
        match field {
            "order_id" => self.order_id = value.as_integer().unwrap_or_default(),
            "line_no" => self.line_no = value.as_integer().unwrap_or_default(),
            "qty" => self.qty = value.as_integer().unwrap_or_default(),
            _ => return false,
        }
        true
    }
}

/// Application-assigned integer key; suppresses the identity flag.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Sku {
    pub code: i64,
    pub label: String,
}

impl Entity for Sku {
    fn shape() -> EntityShape {
        EntityShape::new("Sku")
            .field(FieldSpec::new("code", ScalarKind::Integer).key().assigned())
            .field(FieldSpec::new("label", ScalarKind::Text))
    }

    fn get(&self, field: &str) -> Option<ScalarValue> {
        match field {
            "code" => Some(self.code.into()),
            "label" => Some(self.label.as_str().into()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: ScalarValue) -> bool {
        match field {
            "code" => self.code = value.as_integer().unwrap_or_default(),
            "label" => self.label = value.as_text().unwrap_or_default().to_string(),
            _ => return false,
        }
        true
    }
}
