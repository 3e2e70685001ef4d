use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StockRecord {
    #[serde(default, alias = "id")]
    pub id: String,
    #[serde(alias = "ticker")]
    pub ticker: String,
    #[serde(alias = "target_from")]
    pub target_from: String,
    #[serde(alias = "target_to")]
    pub target_to: String,
    #[serde(default, alias = "company")]
    pub company: String,
    #[serde(default, alias = "action")]
    pub action: String,
    #[serde(default, alias = "brokerage")]
    pub brokerage: String,
    #[serde(default, alias = "rating_from")]
    pub rating_from: String,
    #[serde(default, alias = "rating_to")]
    pub rating_to: String,
    #[serde(alias = "time")]
    pub time: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_feed_snake_case_keys() {
        let v = json!({
            "ticker": "BSBR",
            "target_from": "$4.20",
            "target_to": "$4.70",
            "company": "Banco Santander (Brasil)",
            "action": "upgraded by",
            "brokerage": "The Goldman Sachs Group",
            "rating_from": "Sell",
            "rating_to": "Neutral",
            "time": "2025-01-13T00:30:05.813548892Z"
        });

        let record: StockRecord = serde_json::from_value(v).unwrap();
        assert_eq!(record.ticker, "BSBR");
        assert_eq!(record.target_to, "$4.70");
        assert_eq!(record.rating_from, "Sell");
        assert!(record.id.is_empty());
    }

    #[test]
    fn serializes_with_pascal_case_keys() {
        let record = StockRecord {
            id: "42".to_string(),
            ticker: "AAPL".to_string(),
            target_from: "100".to_string(),
            target_to: "110".to_string(),
            time: "2025-01-01T00:00:00Z".to_string(),
            ..StockRecord::default()
        };

        let v = serde_json::to_value(&record).unwrap();
        assert_eq!(v["Id"], "42");
        assert_eq!(v["TargetFrom"], "100");
        assert_eq!(v["RatingTo"], "");
    }

    #[test]
    fn optional_text_fields_default_to_empty() {
        let v = json!({
            "Ticker": "AAPL",
            "TargetFrom": "100",
            "TargetTo": "110",
            "Time": "2025-01-01T00:00:00Z"
        });

        let record: StockRecord = serde_json::from_value(v).unwrap();
        assert_eq!(record.brokerage, "");
        assert_eq!(record.action, "");
    }
}
