use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use ssg_common::Quantity;
use stock_sync_engine::{
    db_types::{ExternalOrderId, Sku, TokenPair},
    traits::{RemoteLineItem, RemoteOrder},
};

//--------------------------------------   OAuth token exchange   ----------------------------------------------------
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthTokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime of the access token in seconds.
    pub expires_in: i64,
}

impl OAuthTokenResponse {
    pub fn into_token_pair(self) -> TokenPair {
        TokenPair {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: Utc::now() + Duration::seconds(self.expires_in),
        }
    }
}

//--------------------------------------        Allegro           ----------------------------------------------------
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllegroCheckoutForms {
    pub checkout_forms: Vec<AllegroCheckoutForm>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllegroCheckoutForm {
    pub id: String,
    pub status: String,
    pub updated_at: DateTime<Utc>,
    pub line_items: Vec<AllegroLineItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AllegroLineItem {
    pub offer: AllegroOffer,
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AllegroOffer {
    pub external: AllegroExternalId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AllegroExternalId {
    pub id: String,
}

impl AllegroCheckoutForm {
    pub fn into_remote_order(self) -> RemoteOrder {
        RemoteOrder {
            external_order_id: ExternalOrderId::from(self.id),
            created_at: self.updated_at,
            status: self.status,
            line_items: self
                .line_items
                .into_iter()
                .map(|l| RemoteLineItem { sku: Sku::from(l.offer.external.id), quantity: Quantity::from(l.quantity) })
                .collect(),
        }
    }
}

//--------------------------------------          Erli            ----------------------------------------------------
#[derive(Debug, Clone, Deserialize)]
pub struct ErliOrderPage {
    pub orders: Vec<ErliOrder>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErliOrder {
    pub id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub items: Vec<ErliOrderItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErliOrderItem {
    pub external_id: String,
    pub quantity: i64,
}

impl ErliOrder {
    pub fn into_remote_order(self) -> RemoteOrder {
        RemoteOrder {
            external_order_id: ExternalOrderId::from(self.id),
            created_at: self.created_at,
            status: self.status,
            line_items: self
                .items
                .into_iter()
                .map(|i| RemoteLineItem { sku: Sku::from(i.external_id), quantity: Quantity::from(i.quantity) })
                .collect(),
        }
    }
}

//--------------------------------------          Empik           ----------------------------------------------------
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmpikOrderList {
    pub orders: Vec<EmpikOrder>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmpikOrder {
    pub order_id: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<EmpikOrderLine>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmpikOrderLine {
    pub offer_sku: String,
    pub quantity: i64,
}

impl EmpikOrder {
    pub fn into_remote_order(self) -> RemoteOrder {
        RemoteOrder {
            external_order_id: ExternalOrderId::from(self.order_id),
            created_at: self.created_at,
            status: self.state,
            line_items: self
                .lines
                .into_iter()
                .map(|l| RemoteLineItem { sku: Sku::from(l.offer_sku), quantity: Quantity::from(l.quantity) })
                .collect(),
        }
    }
}

//--------------------------------------       Storefront         ----------------------------------------------------
#[derive(Debug, Clone, Deserialize)]
pub struct StorefrontOrderPage {
    pub orders: Vec<StorefrontOrder>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorefrontOrder {
    pub number: String,
    pub status: String,
    pub placed_at: DateTime<Utc>,
    pub line_items: Vec<StorefrontLineItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorefrontLineItem {
    pub sku: String,
    pub quantity: i64,
}

impl StorefrontOrder {
    pub fn into_remote_order(self) -> RemoteOrder {
        RemoteOrder {
            external_order_id: ExternalOrderId::from(self.number),
            created_at: self.placed_at,
            status: self.status,
            line_items: self
                .line_items
                .into_iter()
                .map(|l| RemoteLineItem { sku: Sku::from(l.sku), quantity: Quantity::from(l.quantity) })
                .collect(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn allegro_checkout_form_maps_to_remote_order() {
        let json = r#"{
            "id": "7d1f4e2a-order",
            "status": "READY_FOR_PROCESSING",
            "updatedAt": "2024-06-14T09:30:00Z",
            "lineItems": [
                { "offer": { "external": { "id": "SKU-001" } }, "quantity": 2 },
                { "offer": { "external": { "id": "SKU-002" } }, "quantity": 1 }
            ]
        }"#;
        let form: AllegroCheckoutForm = serde_json::from_str(json).unwrap();
        let order = form.into_remote_order();
        assert_eq!(order.external_order_id, ExternalOrderId::from("7d1f4e2a-order"));
        assert_eq!(order.line_items.len(), 2);
        assert_eq!(order.line_items[0].sku, Sku::from("SKU-001"));
        assert_eq!(order.line_items[0].quantity, Quantity::from(2));
    }

    #[test]
    fn erli_order_maps_to_remote_order() {
        let json = r#"{
            "id": "E-1001",
            "status": "paid",
            "created_at": "2024-06-14T10:00:00Z",
            "items": [ { "external_id": "SKU-003", "quantity": 4 } ]
        }"#;
        let order: ErliOrder = serde_json::from_str(json).unwrap();
        let order = order.into_remote_order();
        assert_eq!(order.external_order_id, ExternalOrderId::from("E-1001"));
        assert_eq!(order.line_items[0].quantity, Quantity::from(4));
    }

    #[test]
    fn token_response_derives_expiry_from_lifetime() {
        let json = r#"{ "access_token": "a", "refresh_token": "r", "expires_in": 3600 }"#;
        let response: OAuthTokenResponse = serde_json::from_str(json).unwrap();
        let pair = response.into_token_pair();
        let lifetime = pair.expires_at - Utc::now();
        assert!(lifetime > Duration::minutes(59) && lifetime <= Duration::minutes(60));
    }
}
