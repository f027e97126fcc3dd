//! Published property listings

use std::sync::Arc;

use backstore::{Property, PropertyBackend, Session};
use tracing::{debug, error};

use crate::lifecycle::RequestLifecycle;

pub const EMPTY_MESSAGE: &str = "No properties available yet";

/// Whole euros with thin grouping: `1250000.0` -> `"1 250 000 €"`
pub fn format_price(price: f64) -> String {
    let rounded = price.round();
    let negative = rounded < 0.0;
    let digits = format!("{}", rounded.abs() as u64);

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }

    if negative {
        format!("-{} €", grouped)
    } else {
        format!("{} €", grouped)
    }
}

pub struct PropertyListView {
    backend: Arc<dyn PropertyBackend>,
    lifecycle: Arc<RequestLifecycle>,
    properties: Vec<Property>,
}

impl PropertyListView {
    pub fn new(backend: Arc<dyn PropertyBackend>, lifecycle: Arc<RequestLifecycle>) -> Self {
        Self {
            backend,
            lifecycle,
            properties: Vec::new(),
        }
    }

    /// Fetch published listings, showing the global loader meanwhile
    ///
    /// A backend failure is logged and leaves the list empty.
    pub async fn load(&mut self, session: Option<&Session>) -> &[Property] {
        debug!(signed_in = session.is_some(), "load: called");
        let in_flight = self.lifecycle.begin();
        let outcome = self.backend.list_published(session).await;
        in_flight.settle();

        self.properties = match outcome {
            Ok(rows) => rows,
            Err(e) => {
                error!(error = %e, "load: failed to fetch properties");
                Vec::new()
            }
        };
        &self.properties
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// One card per property, or the empty-state line
    pub fn render(&self) -> String {
        if self.properties.is_empty() {
            return format!("{}\n", EMPTY_MESSAGE);
        }

        let mut out = String::new();
        for property in &self.properties {
            out.push_str(&format!("{}\n", property.title));
            if !property.description.is_empty() {
                out.push_str(&format!("  {}\n", property.description));
            }
            out.push_str(&format!("  {}  |  {}\n\n", property.city, format_price(property.price)));
        }
        out
    }
}
