//! Products, sales, orders, addresses, shipping and payment handlers

use std::str::FromStr;

use axum::extract::Query;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Extension;
use axum::Form;
use axum::Json;
use regex::Regex;
use tracing::debug;
use tracing::info;

use super::db;
use super::ok_message;
use super::AppState;
use crate::api::error::ApiError;
use crate::api::error::ApiResult;
use crate::api::session::UserSession;
use crate::api::types::AddressForm;
use crate::api::types::LookupQuery;
use crate::api::types::OrderForm;
use crate::api::types::OrderIdForm;
use crate::api::types::ProductForm;
use crate::api::types::SaleForm;
use crate::models::Address;
use crate::models::DataList;
use crate::models::HashResponse;
use crate::models::Order;
use crate::models::Product;
use crate::models::Sale;
use crate::models::Shipping;
use crate::models::StatusResponse;
use crate::validate;
use crate::TwiqError;

/// Parse a numeric form value, answering 400 with `message` on failure
fn number<T: FromStr>(raw: &str, message: &str) -> ApiResult<T> {
    raw.parse().map_err(|_| ApiError::bad_request(message))
}

/// Deliverability of a postal code; `None` when it is not numeric
#[must_use]
pub fn delivery_status(pattern: &Regex, postal_code: &str) -> Option<&'static str> {
    postal_code.parse::<u32>().ok()?;
    Some(if pattern.is_match(postal_code) {
        "Deliverable"
    } else {
        "Not Deliverable"
    })
}

/// POST /product
pub async fn add_product(
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> ApiResult<Json<String>> {
    let product = Product {
        quantity: number(&form.quantity, "Quantity not compatible")?,
        unit_price: number(&form.unit_price, "Unit Price not compatible")?,
        sku: form.sku,
        title: form.title,
        brand: form.brand,
        description: form.description,
        summary: form.summary,
        image: form.image,
        thumb_nail: form.thumb_nail,
        color: form.color,
        size: form.size,
        ..Product::default()
    };
    let id = state
        .docstore
        .add_product(&product)
        .await
        .map_err(db("Failed to create a Product"))?;
    info!("🛍️  Created product {} with {} units", id, product.quantity);
    Ok(Json(id))
}

/// GET /product?pId=
pub async fn get_product(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> ApiResult<Json<Product>> {
    match state.docstore.get_product(&query.product_id).await {
        Ok(product) => Ok(Json(product)),
        Err(e) if e.is_not_found() => Err(ApiError::not_found(format!(
            "No Product found with {}",
            query.product_id
        ))),
        Err(e) => Err(ApiError::database("Failed to retrieve the Product", e)),
    }
}

/// POST /sale
pub async fn add_sale(
    State(state): State<AppState>,
    Form(form): Form<SaleForm>,
) -> ApiResult<Json<String>> {
    let sale = Sale {
        stock_units: number(&form.stock_units, "Stock value not compatible")?,
        sale_start_time: number(&form.sale_start_time, "SaleStartTime not compatible")?,
        sale_end_time: number(&form.sale_end_time, "SaleEndTime not compatible")?,
        title: form.title,
        brand: form.brand,
        product_sku: form.product_sku,
        description: form.description,
        thumb_nail: form.thumb_nail,
        ..Sale::default()
    };
    let id = state
        .database
        .add_sale(&sale)
        .await
        .map_err(db("Failed to create a Sale Listing"))?;
    debug!("Created sale {}", id);
    Ok(Json(id.to_string()))
}

/// GET /sale?sId=
pub async fn get_sale(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> ApiResult<Json<Sale>> {
    let id: i32 = number(&query.sale_id, "Sale Id  not compatible")?;
    let sale = state
        .database
        .get_sale(id)
        .await
        .map_err(db("Failed to retrieve the Sale info"))?
        .ok_or_else(|| ApiError::not_found(format!("No sale exists for {id}")))?;
    Ok(Json(sale))
}

/// GET /sales
pub async fn get_sales(State(state): State<AppState>) -> ApiResult<Json<DataList<Sale>>> {
    let sales = state
        .database
        .get_sales()
        .await
        .map_err(db("Failed to retrieve the Sales info"))?;
    Ok(Json(sales.into()))
}

/// Countdown and remaining stock of a sale (GET /status?sId=)
pub async fn get_status(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> ApiResult<Json<StatusResponse>> {
    let id: i32 = number(&query.sale_id, "Sale Id  not compatible")?;
    let status = state
        .database
        .sale_status(id)
        .await
        .map_err(db("Failed to retrieve the Sale info"))?
        .ok_or_else(|| ApiError::not_found(format!("No sale exists for {id}")))?;
    Ok(Json(status))
}

/// Create an order for an in-stock product (POST /order)
pub async fn create_order(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Form(form): Form<OrderForm>,
) -> ApiResult<Json<String>> {
    let product_id = validate::object_id(&form.product_id)
        .map_err(|_| ApiError::bad_request("Invalid Product Id"))?;

    let product = match state.docstore.get_product(&product_id).await {
        Ok(product) => product,
        Err(e) if e.is_not_found() => {
            return Err(ApiError::not_found(format!(
                "No Product exists with ProductId: {product_id}"
            )));
        }
        Err(e) => return Err(ApiError::database("Failed to retrieve the Product", e)),
    };
    if product.quantity < 1 {
        return Err(ApiError::not_found(format!(
            "Product {product_id} is no longer in Stock"
        )));
    }

    let mut order = Order {
        product_id,
        product_title: product.title,
        product_thumb: product.thumb_nail,
        user_id: session.user_id,
        order_date: number(&form.order_date, "OrderDate not compatible")?,
        price: number(&form.price, "Price not compatible")?,
        tax: number(&form.tax, "Tax not compatible")?,
        shipping_cost: number(&form.shipping_cost, "ShippingCost not compatible")?,
        amount: number(&form.amount, "Amount not compatible")?,
        sale_id: number(&form.sale_id, "SaleId not compatible")?,
        address_id: number(&form.address_id, "AddressId not compatible")?,
        ..Order::default()
    };

    if state
        .database
        .get_address(order.address_id)
        .await
        .map_err(db("Could not check if address exists"))?
        .is_none()
    {
        return Err(ApiError::not_found(
            "Address not found with the given AddressId",
        ));
    }

    order.id = state
        .database
        .create_order(&order)
        .await
        .map_err(db("Failed to create the order"))?;
    info!(
        "🧾 Order {} created by user {} for {}",
        order.id, order.user_id, order.product_id
    );
    Ok(Json(order.id.to_string()))
}

async fn owned_order(state: &AppState, session: &UserSession, id: i32) -> ApiResult<Order> {
    let order = state
        .database
        .get_order(id)
        .await
        .map_err(db("Failed to retrieve the Order info"))?
        .ok_or_else(|| ApiError::not_found(format!("No order exists for {id}")))?;
    if !session.may_access(order.user_id) {
        return Err(ApiError::unauthorized("No such order belongs to the user"));
    }
    Ok(order)
}

/// GET /order?oId=
pub async fn get_order(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Query(query): Query<LookupQuery>,
) -> ApiResult<Json<Order>> {
    let id: i32 = number(&query.order_id, "Order Id  not compatible")?;
    Ok(Json(owned_order(&state, &session, id).await?))
}

/// Orders of the logged-in user (GET /orders)
pub async fn get_orders(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
) -> ApiResult<Json<DataList<Order>>> {
    let orders = state
        .database
        .get_orders(session.user_id)
        .await
        .map_err(db("Failed to retrieve your orders history"))?;
    Ok(Json(orders.into()))
}

/// Open a shipment for an order (POST /placeOrder)
pub async fn place_order(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Form(form): Form<OrderIdForm>,
) -> ApiResult<Json<String>> {
    let order_id: i32 = number(&form.order_id, "OrderId not compatible")?;
    let order = owned_order(&state, &session, order_id).await?;

    let shipping = Shipping {
        order_id,
        user_id: session.user_id,
        address_id: order.address_id,
        ..Shipping::default()
    };
    let id = state
        .database
        .place_order(&shipping)
        .await
        .map_err(db("Failed to place the order"))?;
    info!("📦 Order {} placed, shipping {}", order_id, id);
    Ok(Json(id.to_string()))
}

fn address_from(form: &AddressForm, user_id: i32) -> ApiResult<Address> {
    let phone = validate::phone(&form.phone)?;
    Ok(Address {
        user_id,
        address: form.address.clone(),
        address_type: form.address_type.clone(),
        city: form.city.clone(),
        state: form.state.clone(),
        postal_code: number(&form.postal_code, "Postal Code not compatible")?,
        phone,
        ..Address::default()
    })
}

async fn owned_address(state: &AppState, session: &UserSession, id: i32) -> ApiResult<Address> {
    let address = state
        .database
        .get_address(id)
        .await
        .map_err(db("Failed to retrieve the Address info"))?
        .ok_or_else(|| ApiError::not_found(format!("No address exists for {id}")))?;
    if !session.may_access(address.user_id) {
        return Err(ApiError::unauthorized(
            "No such address belongs to the user",
        ));
    }
    Ok(address)
}

/// POST /address
pub async fn add_address(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Form(form): Form<AddressForm>,
) -> ApiResult<Json<String>> {
    let address = address_from(&form, session.user_id)?;
    let id = state
        .database
        .add_address(&address)
        .await
        .map_err(db("Failed to add the address"))?;
    debug!("Added address {}", id);
    Ok(Json(id.to_string()))
}

/// POST /editAddress
pub async fn edit_address(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Form(form): Form<AddressForm>,
) -> ApiResult<impl IntoResponse> {
    let id: i32 = number(&form.address_id, "Address Id  not compatible")?;
    let existing = owned_address(&state, &session, id).await?;

    let address = Address {
        id,
        ..address_from(&form, existing.user_id)?
    };
    state
        .database
        .edit_address(&address)
        .await
        .map_err(db("Failed to edit the address"))?;
    Ok(ok_message("Address Updated SuccessFully!"))
}

/// GET /address?aId=
pub async fn get_address(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Query(query): Query<LookupQuery>,
) -> ApiResult<Json<Address>> {
    let id: i32 = number(&query.address_id, "Address Id  not compatible")?;
    Ok(Json(owned_address(&state, &session, id).await?))
}

/// Saved addresses of the logged-in user (GET /addresses)
pub async fn get_addresses(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
) -> ApiResult<Json<DataList<Address>>> {
    let addresses = state
        .database
        .get_addresses(session.user_id)
        .await
        .map_err(db("Failed to retrieve your Saved addresses"))?;
    Ok(Json(addresses.into()))
}

/// GET /checkDelivery?pc=
pub async fn check_delivery(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> ApiResult<Json<&'static str>> {
    delivery_status(&state.deliverable, &query.postal_code)
        .map(Json)
        .ok_or_else(|| ApiError::bad_request("Postal Code  not compatible"))
}

/// Reserve stock and sign a PayU request (POST /payment-initiate)
pub async fn initiate_payment(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Form(form): Form<OrderIdForm>,
) -> ApiResult<Json<HashResponse>> {
    let order_id = validate::payment(&form.order_id)?;
    match state.payments.initiate(order_id, session.user_id).await {
        Ok(response) => Ok(Json(response)),
        Err(e @ (TwiqError::NotFound(_) | TwiqError::OutOfStock(_) | TwiqError::Validation(_))) => {
            Err(e.into())
        }
        Err(e) => Err(ApiError::internal("Failed to get Hash").caused_by(&e)),
    }
}
