use serde::{Deserialize, Serialize};

/// Represents a single bill record as stored by the remote bill store.
///
/// Records coming back from the store are heterogeneous: older records may be
/// missing fields entirely, so everything is defaulted during deserialization
/// rather than failing the whole list fetch on one sparse record.
///
/// `file_url` and `file_name` are either both `None` or both `Some`; they are
/// set together when a receipt upload succeeds and never individually.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Bill {
    /// Assigned by the store when the receipt is uploaded; absent on a draft
    /// that has never been transmitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The expense category label, e.g. "Transports". Stored as a free string
    /// even though the form offers a fixed set of categories.
    #[serde(rename = "type")]
    pub bill_type: String,
    /// Free-text expense description.
    pub name: String,
    /// Whole currency units. Form input is a string; the stored record is
    /// always an integer.
    pub amount: i64,
    /// `YYYY-MM-DD`, stored verbatim. Display formatting happens separately.
    pub date: String,
    /// Free string, may be empty. Never numerically parsed.
    pub vat: String,
    /// Integer percentage. Defaults to 20 when the form input is missing or
    /// unparsable.
    pub pct: i64,
    pub commentary: String,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    /// One of "pending", "accepted", "refused". Transitions away from
    /// "pending" are performed by an admin, never by this client.
    pub status: String,
    /// Populated by the admin flow; this client never sets it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_admin: Option<String>,
    /// The submitting employee's email, taken from the session.
    pub email: String,
}

/// The lifecycle states a stored bill can be in. New bills are always created
/// as `Pending`.
#[derive(Default, Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    #[default]
    Pending,
    Accepted,
    Refused,
}

serde_plain::derive_display_from_serialize!(BillStatus);
serde_plain::derive_fromstr_from_deserialize!(BillStatus);

/// The expense categories offered by the submission form. The wire format
/// keeps `type` as a free string; this enum exists to validate user input and
/// to advertise the known set in the CLI help.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum ExpenseType {
    #[serde(rename = "Transports")]
    Transports,
    #[serde(rename = "Restaurants et bars")]
    RestaurantsEtBars,
    #[serde(rename = "Hôtel et logement")]
    HotelEtLogement,
    #[serde(rename = "Services en ligne")]
    ServicesEnLigne,
    #[serde(rename = "IT et électronique")]
    ItEtElectronique,
    #[serde(rename = "Equipement et matériel")]
    EquipementEtMateriel,
    #[serde(rename = "Fournitures de bureau")]
    FournituresDeBureau,
}

serde_plain::derive_display_from_serialize!(ExpenseType);
serde_plain::derive_fromstr_from_deserialize!(ExpenseType);

impl ExpenseType {
    /// All known categories, in the order the form presents them.
    pub const ALL: [ExpenseType; 7] = [
        ExpenseType::Transports,
        ExpenseType::RestaurantsEtBars,
        ExpenseType::HotelEtLogement,
        ExpenseType::ServicesEnLigne,
        ExpenseType::ItEtElectronique,
        ExpenseType::EquipementEtMateriel,
        ExpenseType::FournituresDeBureau,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_deserialize_full_record() {
        let json = r#"{
            "id": "47qAXb6fIm2zOKkLzMro",
            "type": "Hôtel et logement",
            "name": "séminaire",
            "amount": 400,
            "date": "2004-04-04",
            "vat": "80",
            "pct": 20,
            "commentary": "séminaire équipe",
            "fileUrl": "https://storage.test/receipts/note.jpg",
            "fileName": "note.jpg",
            "status": "pending",
            "commentAdmin": "ok",
            "email": "a@a"
        }"#;
        let bill: Bill = serde_json::from_str(json).unwrap();
        assert_eq!(bill.bill_type, "Hôtel et logement");
        assert_eq!(bill.amount, 400);
        assert_eq!(bill.file_url.as_deref(), Some("https://storage.test/receipts/note.jpg"));
        assert_eq!(bill.comment_admin.as_deref(), Some("ok"));
    }

    #[test]
    fn test_deserialize_sparse_record() {
        // Older records can be missing almost everything.
        let json = r#"{"id": "abc", "date": "2002-02-02", "status": "refused"}"#;
        let bill: Bill = serde_json::from_str(json).unwrap();
        assert_eq!(bill.amount, 0);
        assert_eq!(bill.vat, "");
        assert!(bill.file_url.is_none());
        assert!(bill.file_name.is_none());
    }

    #[test]
    fn test_serialize_uses_wire_names() {
        let bill = Bill {
            bill_type: "Transports".to_string(),
            file_url: Some("u".to_string()),
            file_name: Some("n".to_string()),
            ..Bill::default()
        };
        let json = serde_json::to_string(&bill).unwrap();
        assert!(json.contains("\"type\":\"Transports\""));
        assert!(json.contains("\"fileUrl\":\"u\""));
        assert!(json.contains("\"fileName\":\"n\""));
        // A draft has no id and the client never writes commentAdmin.
        assert!(!json.contains("\"id\""));
        assert!(!json.contains("\"commentAdmin\""));
    }

    #[test]
    fn test_status_to_string() {
        assert_eq!(BillStatus::Pending.to_string(), "pending");
        assert_eq!(BillStatus::Accepted.to_string(), "accepted");
        assert_eq!(BillStatus::Refused.to_string(), "refused");
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!(BillStatus::from_str("pending").unwrap(), BillStatus::Pending);
        assert!(BillStatus::from_str("cancelled").is_err());
    }

    #[test]
    fn test_expense_type_labels() {
        assert_eq!(ExpenseType::Transports.to_string(), "Transports");
        assert_eq!(
            ExpenseType::from_str("Restaurants et bars").unwrap(),
            ExpenseType::RestaurantsEtBars
        );
        assert!(ExpenseType::from_str("Cadeaux").is_err());
    }
}
