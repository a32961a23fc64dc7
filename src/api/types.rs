//! API request types
//!
//! Fields arrive as url-encoded form values (query string for GET). They are
//! kept as strings so handlers can report which field failed to parse.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PhoneForm {
    pub phone: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LoginForm {
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SignUpForm {
    pub phone: String,
    pub code: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ResetPasswordForm {
    pub phone: String,
    pub reset_password_token: String,
    pub new_password: String,
    pub new_password_repeat: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PostIdForm {
    pub post_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PostLinkForm {
    pub post_id: String,
    pub mascot_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct FeedForm {
    pub last_sync: String,
    pub mascot_id: String,
    pub flag: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ProductForm {
    pub sku: String,
    pub title: String,
    pub brand: String,
    pub quantity: String,
    pub description: String,
    pub unit_price: String,
    pub summary: String,
    pub image: String,
    pub thumb_nail: String,
    pub color: String,
    pub size: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SaleForm {
    pub title: String,
    pub brand: String,
    pub product_sku: String,
    pub description: String,
    pub thumb_nail: String,
    pub stock_units: String,
    pub sale_start_time: String,
    pub sale_end_time: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct OrderForm {
    pub product_id: String,
    pub order_date: String,
    pub price: String,
    pub tax: String,
    pub shipping_cost: String,
    pub amount: String,
    pub sale_id: String,
    pub address_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AddressForm {
    pub address_id: String,
    pub address: String,
    pub address_type: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub phone: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct FeedbackForm {
    #[serde(rename = "Type")]
    pub feedback_type: String,
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct OrderIdForm {
    pub order_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TokenForm {
    pub token: String,
}

/// `Type` is "1" to add `Url`, "0" to remove it
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CacheUrlForm {
    pub url: String,
    #[serde(rename = "Type")]
    pub op: String,
}

/// Short query keys used by the lookup endpoints
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LookupQuery {
    #[serde(rename = "pId")]
    pub product_id: String,
    #[serde(rename = "sId")]
    pub sale_id: String,
    #[serde(rename = "oId")]
    pub order_id: String,
    #[serde(rename = "aId")]
    pub address_id: String,
    #[serde(rename = "pc")]
    pub postal_code: String,
    pub token: String,
}
