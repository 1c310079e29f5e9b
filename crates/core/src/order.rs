//! Finish-order form validation and the order request built from it.

use serde::{Deserialize, Serialize};

use crate::cart::CartLine;
use crate::types::{ConsumptionMethod, Cpf, ProductId, Slug};

/// Shown when the name field is blank.
pub const NAME_REQUIRED: &str = "O nome é obrigatório.";
/// Shown when the CPF field is blank.
pub const CPF_REQUIRED: &str = "O CPF é obrigatório.";
/// Shown when the CPF fails validation.
pub const CPF_INVALID: &str = "CPF inválido.";

/// Raw finish-order form input, exactly as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cpf: String,
}

/// Per-field validation messages. `None` means the field is fine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub name: Option<&'static str>,
    pub cpf: Option<&'static str>,
}

impl FieldErrors {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.cpf.is_none()
    }
}

/// Customer identification that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub name: String,
    pub cpf: Cpf,
}

impl CustomerForm {
    /// Validate both fields, reporting every failing field at once.
    ///
    /// Both values are trimmed first. The returned name is the trimmed one.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages if the name is blank, the CPF is blank,
    /// or the CPF is not a valid tax id.
    pub fn validate(&self) -> Result<Customer, FieldErrors> {
        let name = self.name.trim();
        let cpf = self.cpf.trim();

        let mut errors = FieldErrors::default();

        if name.is_empty() {
            errors.name = Some(NAME_REQUIRED);
        }

        let parsed = if cpf.is_empty() {
            errors.cpf = Some(CPF_REQUIRED);
            None
        } else {
            let parsed = Cpf::parse(cpf).ok();
            if parsed.is_none() {
                errors.cpf = Some(CPF_INVALID);
            }
            parsed
        };

        match parsed {
            Some(cpf) if errors.is_empty() => Ok(Customer {
                name: name.to_owned(),
                cpf,
            }),
            _ => Err(errors),
        }
    }
}

/// Reasons an order request cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    /// One or more form fields failed validation.
    #[error("invalid customer details")]
    InvalidFields(FieldErrors),
    /// The cart has no lines.
    #[error("cart is empty")]
    EmptyCart,
}

/// Product id and quantity, as sent to the order API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: ProductId,
    pub quantity: u32,
}

/// Everything needed to create an order. Built once at submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    customer_name: String,
    customer_tax_id: Cpf,
    lines: Vec<CartLine>,
    store_slug: Slug,
    consumption_method: ConsumptionMethod,
}

impl OrderRequest {
    /// Build a request from a validated customer and the current cart lines.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::EmptyCart`] if `lines` is empty.
    pub fn new(
        customer: Customer,
        lines: Vec<CartLine>,
        store_slug: Slug,
        consumption_method: ConsumptionMethod,
    ) -> Result<Self, OrderError> {
        if lines.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        Ok(Self {
            customer_name: customer.name,
            customer_tax_id: customer.cpf,
            lines,
            store_slug,
            consumption_method,
        })
    }

    /// Validate `form` and build the request in one step.
    ///
    /// Field errors take precedence over an empty cart.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidFields`] or [`OrderError::EmptyCart`].
    pub fn from_form(
        form: &CustomerForm,
        lines: Vec<CartLine>,
        store_slug: Slug,
        consumption_method: ConsumptionMethod,
    ) -> Result<Self, OrderError> {
        let customer = form.validate().map_err(OrderError::InvalidFields)?;
        Self::new(customer, lines, store_slug, consumption_method)
    }

    #[must_use]
    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    #[must_use]
    pub const fn customer_tax_id(&self) -> &Cpf {
        &self.customer_tax_id
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub const fn store_slug(&self) -> &Slug {
        &self.store_slug
    }

    #[must_use]
    pub const fn consumption_method(&self) -> ConsumptionMethod {
        self.consumption_method
    }

    /// Lines reduced to product id and quantity, in cart order.
    #[must_use]
    pub fn products(&self) -> Vec<OrderLine> {
        self.lines
            .iter()
            .map(|line| OrderLine {
                id: line.product_id,
                quantity: line.quantity.get(),
            })
            .collect()
    }
}
