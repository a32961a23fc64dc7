//! Domain types shared by the stores, services and HTTP layer
//!
//! JSON field names are PascalCase to match the mobile clients. Columns in
//! PostgreSQL are snake_case and map onto the same structs via `sqlx::FromRow`.

use serde::Deserialize;
use serde::Serialize;

/// Id of the mascot every new post is linked to by the portal
pub const DEFAULT_MASCOT_ID: i32 = 1;
pub const DEFAULT_MASCOT_NAME: &str = "Default Mascot";
pub const DEFAULT_MASCOT_DESCRIPTION: &str = "This is a default mascot";

/// Lower bound for "top of feed" queries; every real link is newer
pub const DEFAULT_TIMESTAMP: i64 = -1;

/// Placeholder for order/transaction fields not yet known
pub const UNINITIATED: &str = "Uninitiated";
pub const UNINITIATED_ID: i32 = -1;
pub const DEFAULT_STRING: &str = "Default";

/// Access roles, numbered as stored in the `roles` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    User,
    Writer,
}

impl Role {
    pub const ALL: &'static [Self] = &[Self::Admin, Self::User, Self::Writer];
    pub const STAFF: &'static [Self] = &[Self::Admin, Self::Writer];
    pub const ADMIN: &'static [Self] = &[Self::Admin];

    #[must_use]
    pub const fn id(self) -> i32 {
        match self {
            Self::Admin => 1,
            Self::User => 2,
            Self::Writer => 3,
        }
    }

    #[must_use]
    pub const fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Self::Admin),
            2 => Some(Self::User),
            3 => Some(Self::Writer),
            _ => None,
        }
    }

    /// Name seeded into the `roles` table
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::User => "UserRole",
            Self::Writer => "WriterRole",
        }
    }
}

fn is_zero(v: &i32) -> bool {
    *v == 0
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    #[serde(skip)]
    pub id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip)]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub phone: String,
    #[serde(skip)]
    pub time_of_creation: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub verified: i32,
    #[serde(skip)]
    pub code: Option<String>,
    /// Firebase registration token of the user's device
    #[serde(skip)]
    pub token: Option<String>,
    #[serde(skip)]
    pub reset_password_token: Option<String>,
}

impl User {
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        self.verified == 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct PostLink {
    pub time_of_creation: i64,
    pub post_id: String,
    pub mascot_id: i32,
}

/// Post card layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardType {
    Image,
    Article,
    Gif,
    DateSeparator,
    List,
}

impl CardType {
    #[must_use]
    pub const fn from_i32(v: i32) -> Option<Self> {
        match v {
            0 => Some(Self::Image),
            1 => Some(Self::Article),
            2 => Some(Self::Gif),
            3 => Some(Self::DateSeparator),
            4 => Some(Self::List),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_i32(self) -> i32 {
        match self {
            Self::Image => 0,
            Self::Article => 1,
            Self::Gif => 2,
            Self::DateSeparator => 3,
            Self::List => 4,
        }
    }

    /// Cards that render media and therefore need `Src`/`DpSrc`
    #[must_use]
    pub const fn carries_media(self) -> bool {
        matches!(self, Self::Image | Self::Article | Self::Gif)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Post {
    pub id: String,
    pub time_of_creation: i64,
    pub card_type: i32,
    pub src: String,
    pub dp_src: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub button_text: String,
    pub child_posts: Vec<String>,
    /// Time the post was linked into the mascot queue; set at read time
    pub time_of_link: i64,
    /// Serialized child posts of a list card; set at read time
    pub child_posts_json: String,
    pub gradient_start: String,
    pub gradient_end: String,
    pub icon: String,
}

impl Post {
    #[must_use]
    pub fn card(&self) -> Option<CardType> {
        CardType::from_i32(self.card_type)
    }

    #[must_use]
    pub fn is_list(&self) -> bool {
        self.card() == Some(CardType::List)
    }

    /// Copy without the read-time fields, as persisted in the document store
    #[must_use]
    pub fn stored(&self) -> Self {
        Self {
            time_of_link: 0,
            child_posts_json: String::new(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Product {
    pub id: String,
    pub sku: String,
    pub title: String,
    pub brand: String,
    pub quantity: i32,
    pub description: String,
    pub unit_price: i32,
    pub summary: String,
    pub image: String,
    pub thumb_nail: String,
    pub color: String,
    pub size: String,
    pub time_of_creation: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct Sale {
    pub id: i32,
    pub title: String,
    pub brand: String,
    pub product_sku: String,
    pub description: String,
    pub thumb_nail: String,
    pub stock_units: i32,
    pub sale_start_time: i64,
    pub sale_end_time: i64,
    pub time_of_creation: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct Order {
    pub id: i32,
    pub product_id: String,
    pub product_title: String,
    pub product_thumb: String,
    #[serde(skip_serializing, default)]
    pub user_id: i32,
    pub order_date: i64,
    pub price: i32,
    pub tax: i32,
    pub shipping_cost: i32,
    pub amount: i32,
    pub trans_id: i32,
    pub trans_status: String,
    pub sale_id: i32,
    pub address_id: i32,
    pub shipping_id: i32,
    pub shipping_status: String,
    pub tracking_id: String,
    pub time_of_creation: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct Shipping {
    pub id: i32,
    pub order_id: i32,
    #[serde(skip_serializing, default)]
    pub user_id: i32,
    pub tracking_id: String,
    pub address_id: i32,
    pub shipping_status: String,
    pub time_of_creation: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct Address {
    pub id: i32,
    #[serde(skip_serializing, default)]
    pub user_id: i32,
    pub address: String,
    pub address_type: String,
    pub city: String,
    pub state: String,
    pub postal_code: i32,
    pub phone: String,
    pub time_of_creation: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct Transaction {
    pub id: i32,
    pub amount: i32,
    pub order_id: i32,
    pub phone: i64,
    pub time_of_creation: i64,
    pub product_info: String,
    pub email: String,
    pub payment_method: String,
    pub payment_id: String,
    pub payment_status: String,
    pub first_name: String,
    pub hash: String,
}

impl Transaction {
    /// Placeholder row written when a payment is initiated
    #[must_use]
    pub fn placeholder(order_id: i32) -> Self {
        Self {
            id: UNINITIATED_ID,
            amount: UNINITIATED_ID,
            order_id,
            phone: i64::from(UNINITIATED_ID),
            time_of_creation: 0,
            product_info: DEFAULT_STRING.to_string(),
            email: DEFAULT_STRING.to_string(),
            payment_method: DEFAULT_STRING.to_string(),
            payment_id: DEFAULT_STRING.to_string(),
            payment_status: DEFAULT_STRING.to_string(),
            first_name: DEFAULT_STRING.to_string(),
            hash: DEFAULT_STRING.to_string(),
        }
    }
}

/// Feedback categories accepted by `/feedback`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackType {
    Feedback,
    ContactUs,
}

impl FeedbackType {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Feedback" => Some(Self::Feedback),
            "ContactUs" => Some(Self::ContactUs),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Feedback => "Feedback",
            Self::ContactUs => "ContactUs",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct Feedback {
    pub id: i32,
    #[serde(skip_serializing, default)]
    pub user_id: i32,
    #[serde(rename = "Type")]
    pub feedback_type: String,
    pub description: String,
    pub time_of_creation: i64,
}

/// Countdown for a sale
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct StatusResponse {
    /// Nanoseconds until the sale starts; negative once started
    pub time_to_start: i64,
    pub stock_left: i32,
}

/// Everything the client needs to post a PayU payment form
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct HashResponse {
    pub hash: String,
    pub txn_id: i32,
    pub amount: i32,
    pub product_info: String,
    pub first_name: String,
    pub email: String,
    pub key: String,
    pub phone: i64,
    pub surl: String,
    pub furl: String,
}

/// OTP challenge returned by `/initiateSignUp`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct InitiateSignUpResponse {
    pub sum: u32,
    pub product: u32,
}

/// `{"Data": [...]}` list envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DataList<T> {
    pub data: Vec<T>,
}

impl<T> From<Vec<T>> for DataList<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}

/// Current time as UTC nanoseconds since the epoch
#[must_use]
pub fn now_nanos() -> i64 {
    chrono::Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_json_hides_credentials() {
        let user = User {
            id: 7,
            password: Some("hash".into()),
            first_name: Some("Asha".into()),
            phone: "9000000000".into(),
            verified: 1,
            code: Some("1234".into()),
            ..User::default()
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["FirstName"], "Asha");
        assert_eq!(json["Phone"], "9000000000");
        assert_eq!(json["Verified"], 1);
        assert!(json.get("Password").is_none());
        assert!(json.get("Code").is_none());
        assert!(json.get("Id").is_none());
        assert!(json.get("Email").is_none());
    }

    #[test]
    fn test_post_wire_names() {
        let post = Post {
            id: "5a1b2c3d4e5f60718293a4b5".into(),
            card_type: CardType::Article.as_i32(),
            dp_src: "dp.png".into(),
            button_text: "Read".into(),
            ..Post::default()
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["Id"], "5a1b2c3d4e5f60718293a4b5");
        assert_eq!(json["CardType"], 1);
        assert_eq!(json["DpSrc"], "dp.png");
        assert_eq!(json["ButtonText"], "Read");
        assert_eq!(json["ChildPostsJson"], "");
    }

    #[test]
    fn test_stored_post_drops_read_time_fields() {
        let post = Post {
            time_of_link: 42,
            child_posts_json: "[]".into(),
            title: "t".into(),
            ..Post::default()
        };
        let stored = post.stored();
        assert_eq!(stored.time_of_link, 0);
        assert!(stored.child_posts_json.is_empty());
        assert_eq!(stored.title, "t");
    }

    #[test]
    fn test_order_hides_user_id() {
        let order = Order {
            id: 3,
            user_id: 99,
            ..Order::default()
        };
        let json = serde_json::to_value(&order).unwrap();
        assert!(json.get("UserId").is_none());
        assert_eq!(json["Id"], 3);
    }

    #[test]
    fn test_role_ids_round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::from_id(role.id()), Some(*role));
        }
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::User.name(), "UserRole");
    }

    #[test]
    fn test_placeholder_transaction() {
        let tran = Transaction::placeholder(12);
        assert_eq!(tran.order_id, 12);
        assert_eq!(tran.amount, -1);
        assert_eq!(tran.payment_status, "Default");
    }

    #[test]
    fn test_feedback_type_parse() {
        assert_eq!(FeedbackType::parse("ContactUs"), Some(FeedbackType::ContactUs));
        assert_eq!(FeedbackType::parse("feedback"), None);
    }
}
