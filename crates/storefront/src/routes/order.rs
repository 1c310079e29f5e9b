//! Finish-order form and submission.
//!
//! Submission walks the session's [`SubmissionState`]:
//! validate the form, mark the submission pending, call the order API, then
//! either redirect to the hosted checkout, show the "order received" page, or
//! show the form again after a failure.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use comanda_core::{
    Cart, ConsumptionMethod, CustomerForm, FieldErrors, OrderError, OrderRequest,
};

use super::cart::CartView;
use super::{MethodQuery, find_restaurant};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::menu::Restaurant;
use crate::middleware::CspNonce;
use crate::models::{load_cart, load_submission, save_cart, save_submission};
use crate::state::AppState;

/// Shown when the cart has no lines.
pub const EMPTY_CART_NOTICE: &str = "Seu carrinho está vazio.";

/// Shown when the order API call fails for any reason.
pub const ORDER_FAILED_NOTICE: &str = "Não foi possível finalizar o pedido. Tente novamente.";

/// Finish-order form template.
#[derive(Template, WebTemplate)]
#[template(path = "order/finish.html")]
pub struct FinishOrderTemplate {
    pub slug: String,
    pub restaurant_name: String,
    pub method: ConsumptionMethod,
    pub cart: CartView,
    pub name: String,
    pub cpf: String,
    pub errors: FieldErrors,
    pub notice: Option<&'static str>,
    pub nonce: String,
}

/// Shown when the order was created but no payment redirect is configured.
#[derive(Template, WebTemplate)]
#[template(path = "order/received.html")]
pub struct OrderReceivedTemplate {
    pub slug: String,
    pub restaurant_name: String,
    pub method: ConsumptionMethod,
    pub customer_name: String,
    pub session_id: String,
}

impl FinishOrderTemplate {
    fn new(
        restaurant: &Restaurant,
        method: ConsumptionMethod,
        cart: &Cart,
        form: &CustomerForm,
        nonce: String,
    ) -> Self {
        Self {
            slug: restaurant.slug.to_string(),
            restaurant_name: restaurant.name.clone(),
            method,
            cart: CartView::from(cart),
            name: form.name.clone(),
            cpf: form.cpf.clone(),
            errors: FieldErrors::default(),
            notice: None,
            nonce,
        }
    }

    fn with_errors(mut self, errors: FieldErrors) -> Self {
        self.errors = errors;
        self
    }

    fn with_notice(mut self, notice: &'static str) -> Self {
        self.notice = Some(notice);
        self
    }
}

/// Display the finish-order form.
#[instrument(skip(state, session, nonce))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    Path(slug): Path<String>,
    Query(query): Query<MethodQuery>,
) -> Result<Response> {
    let restaurant = find_restaurant(&state, &slug)?;
    let cart = load_cart(&session, &restaurant.slug).await?;

    Ok(FinishOrderTemplate::new(
        restaurant,
        query.method(),
        &cart,
        &CustomerForm::default(),
        nonce,
    )
    .into_response())
}

/// Submit the finish-order form.
///
/// - invalid fields or an empty cart: 422 with the form re-rendered
/// - a submission already pending: 409
/// - order API failure: 502 with the form re-rendered and a notice
/// - success: 303 to the hosted checkout, or the "order received" page when
///   no payment public key is configured
///
/// The session is flushed explicitly after `begin` and after the outcome:
/// the session layer does not save on 5xx responses.
#[instrument(skip(state, session, nonce, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    Path(slug): Path<String>,
    Query(query): Query<MethodQuery>,
    Form(form): Form<CustomerForm>,
) -> Result<Response> {
    let restaurant = find_restaurant(&state, &slug)?;
    let method = query.method();

    // Held until Pending is stored. Must be taken before the first session
    // read, which caches the record for the rest of the request.
    let guard = match session.id() {
        Some(id) => Some(state.submission_locks().acquire(id).await),
        None => None,
    };

    let mut cart = load_cart(&session, &restaurant.slug).await?;
    let page = FinishOrderTemplate::new(restaurant, method, &cart, &form, nonce);

    let request = match OrderRequest::from_form(
        &form,
        cart.lines().to_vec(),
        restaurant.slug.clone(),
        method,
    ) {
        Ok(request) => request,
        Err(OrderError::InvalidFields(errors)) => {
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page.with_errors(errors)).into_response());
        }
        Err(OrderError::EmptyCart) => {
            return Ok(
                (StatusCode::UNPROCESSABLE_ENTITY, page.with_notice(EMPTY_CART_NOTICE))
                    .into_response(),
            );
        }
    };

    let mut submission = load_submission(&session).await?;
    submission
        .begin(unix_now())
        .map_err(|e| AppError::Conflict(e.to_string()))?;
    save_submission(&session, &submission).await?;
    session.save().await?;
    drop(guard);

    let result = state.orders().create_order(&request).await;
    let redirect = result
        .as_ref()
        .ok()
        .and_then(|checkout| state.payment().checkout_url(&checkout.session_id));

    let transition = match &result {
        Ok(checkout) => {
            cart.clear();
            submission.complete(checkout.session_id.clone(), redirect.is_some())
        }
        Err(_) => submission.fail(),
    };
    save_submission(&session, &submission).await?;
    save_cart(&session, &restaurant.slug, &cart).await?;
    session.save().await?;
    transition.map_err(internal)?;

    let checkout = match result {
        Ok(checkout) => checkout,
        Err(e) => {
            let err = AppError::from(e);
            err.report();
            return Ok((err.status(), page.with_notice(ORDER_FAILED_NOTICE)).into_response());
        }
    };

    add_breadcrumb(
        "order",
        "Order submitted",
        Some(&[
            ("slug", restaurant.slug.as_str()),
            ("consumption_method", method.as_str()),
        ]),
    );

    match redirect {
        Some(url) => Ok(Redirect::to(url.as_str()).into_response()),
        None => {
            tracing::info!(
                session_id = %checkout.session_id,
                "Payment public key not configured, skipping checkout redirect"
            );
            Ok(OrderReceivedTemplate {
                slug: restaurant.slug.to_string(),
                restaurant_name: restaurant.name.clone(),
                method,
                customer_name: request.customer_name().to_string(),
                session_id: checkout.session_id,
            }
            .into_response())
        }
    }
}

/// Current time in unix seconds.
fn unix_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}

fn internal(err: impl std::fmt::Display) -> AppError {
    AppError::Internal(err.to_string())
}

