use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Overdue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub description: String,
    pub quantity: f64,
    pub rate: f64,
    pub amount: f64,
}

impl InvoiceItem {
    pub fn new(description: impl Into<String>, quantity: f64, rate: f64) -> Self {
        Self {
            description: description.into(),
            quantity,
            rate,
            amount: quantity * rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub estimate_id: Option<Uuid>,
    pub client_name: String,
    pub client_email: String,
    pub client_address: String,
    pub date: DateTime<Utc>,
    pub status: InvoiceStatus,
    pub items: Vec<InvoiceItem>,
    pub total: f64,
    pub payment_link: String,
}

impl Invoice {
    /// Builds a draft invoice; `total` defaults to the sum of the line amounts.
    pub fn from_items(
        client_name: impl Into<String>,
        date: DateTime<Utc>,
        items: Vec<InvoiceItem>,
        total: Option<f64>,
    ) -> Self {
        let total = total.unwrap_or_else(|| items.iter().map(|i| i.amount).sum());
        Self {
            id: Uuid::new_v4(),
            estimate_id: None,
            client_name: client_name.into(),
            client_email: String::new(),
            client_address: String::new(),
            date,
            status: InvoiceStatus::Draft,
            items,
            total,
            payment_link: String::new(),
        }
    }

    /// Short human-facing number, e.g. `INV-3F2A9C`.
    pub fn invoice_number(&self) -> String {
        let hex = self.id.simple().to_string();
        format!("INV-{}", hex[..6].to_uppercase())
    }
}
