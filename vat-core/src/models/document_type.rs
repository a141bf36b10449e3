use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of document backing a vehicle purchase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    #[default]
    Invoice,
    InvoiceReceipt,
    SimplifiedInvoice,
    Declaration,
}

impl DocumentType {
    pub const ALL: [DocumentType; 4] = [
        DocumentType::Invoice,
        DocumentType::InvoiceReceipt,
        DocumentType::SimplifiedInvoice,
        DocumentType::Declaration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invoice => "Fatura",
            Self::InvoiceReceipt => "Fatura-Recibo",
            Self::SimplifiedInvoice => "Fatura Simplificada",
            Self::Declaration => "Declaração",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|doc| doc.as_str() == s)
    }
}

impl fmt::Display for DocumentType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
