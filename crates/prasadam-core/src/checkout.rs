//! Checkout flow: order summary, contact form, submission.
//!
//! State moves `Idle -> SummaryOpen -> Submitting -> Succeeded | Failed`.
//! Submission is split into `begin_submit` and `finish_submit` so the UI can
//! send the request from a background task and apply the answer later;
//! `submit` runs both around an inline gateway call.

use thiserror::Error;
use tracing::{info, warn};

use crate::api::OrderGateway;
use crate::cart::CartManager;
use crate::models::{Cart, ContactDetails, ContactField, OrderRequest, OrderResponse, OrderSummary};

pub const TRANSPORT_FAILURE_MESSAGE: &str = "Failed to place order. Please try again.";

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Checkout is not open")]
    NotOpen,

    #[error("An order is already being placed")]
    AlreadySubmitting,

    #[error("{} is required", .0.label())]
    MissingField(ContactField),

    #[error("Failed to encode order: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutFailure {
    /// The server answered `success: false`.
    Rejected(String),
    /// The request never got an answer.
    Transport,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutState {
    Idle,
    SummaryOpen(OrderSummary),
    Submitting,
    Succeeded { order_id: Option<String> },
    Failed(CheckoutFailure),
}

/// What a finished submission means for the user.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Placed {
        order_id: Option<String>,
        /// False if the emptied cart could not be saved.
        cart_saved: bool,
    },
    Rejected(String),
    TransportFailed,
}

impl SubmitOutcome {
    pub fn message(&self) -> String {
        match self {
            SubmitOutcome::Placed { order_id, .. } => format!(
                "Order placed successfully! Your order ID is: {}",
                order_id.as_deref().unwrap_or("unknown")
            ),
            SubmitOutcome::Rejected(reason) => format!("Failed to place order: {}", reason),
            SubmitOutcome::TransportFailed => TRANSPORT_FAILURE_MESSAGE.to_string(),
        }
    }

    pub fn is_placed(&self) -> bool {
        matches!(self, SubmitOutcome::Placed { .. })
    }
}

#[derive(Debug)]
pub struct CheckoutCoordinator {
    state: CheckoutState,
    /// Snapshot shown in the dialog; kept through Submitting and Failed.
    summary: Option<OrderSummary>,
    form: ContactDetails,
    in_flight: bool,
}

impl Default for CheckoutCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutCoordinator {
    pub fn new() -> Self {
        Self {
            state: CheckoutState::Idle,
            summary: None,
            form: ContactDetails::default(),
            in_flight: false,
        }
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn summary(&self) -> Option<&OrderSummary> {
        self.summary.as_ref()
    }

    pub fn form(&self) -> &ContactDetails {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ContactDetails {
        &mut self.form
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, CheckoutState::Idle)
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight
    }

    /// Open the dialog with a snapshot of `cart`. Returns false, with no
    /// transition, if the cart is empty.
    pub fn open_summary(&mut self, cart: &Cart) -> bool {
        if cart.is_empty() {
            return false;
        }
        let summary = OrderSummary::from_cart(cart);
        self.summary = Some(summary.clone());
        self.state = CheckoutState::SummaryOpen(summary);
        true
    }

    /// Validate the form and build the request; moves to `Submitting`.
    pub fn begin_submit(&mut self, cart: &Cart) -> Result<OrderRequest, CheckoutError> {
        if self.in_flight {
            return Err(CheckoutError::AlreadySubmitting);
        }
        if !matches!(self.state, CheckoutState::SummaryOpen(_) | CheckoutState::Failed(_)) {
            return Err(CheckoutError::NotOpen);
        }
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if let Some(field) = self.form.first_missing() {
            return Err(CheckoutError::MissingField(field));
        }

        let request = OrderRequest::new(&self.form, cart)?;
        self.state = CheckoutState::Submitting;
        self.in_flight = true;
        info!(lines = cart.len(), total = request.total_amount, "Placing order");
        Ok(request)
    }

    /// Apply the answer to an order started with `begin_submit`.
    ///
    /// On success the cart is cleared and the form reset even if the dialog
    /// was closed in the meantime; the state only changes if the dialog is
    /// still waiting on this submission.
    pub fn finish_submit(
        &mut self,
        result: anyhow::Result<OrderResponse>,
        cart: &mut CartManager,
    ) -> SubmitOutcome {
        self.in_flight = false;

        let outcome = match result {
            Ok(response) if response.success => {
                let cart_saved = cart.clear().is_ok();
                self.form.clear();
                info!(order_id = ?response.order_id, "Order placed");
                SubmitOutcome::Placed {
                    order_id: response.order_id,
                    cart_saved,
                }
            }
            Ok(response) => {
                let reason = response.rejection_reason();
                warn!(reason = %reason, "Order rejected");
                SubmitOutcome::Rejected(reason)
            }
            Err(e) => {
                warn!(error = %e, "Order request failed");
                SubmitOutcome::TransportFailed
            }
        };

        if self.state == CheckoutState::Submitting {
            self.state = match &outcome {
                SubmitOutcome::Placed { order_id, .. } => {
                    self.summary = None;
                    CheckoutState::Succeeded {
                        order_id: order_id.clone(),
                    }
                }
                SubmitOutcome::Rejected(reason) => {
                    CheckoutState::Failed(CheckoutFailure::Rejected(reason.clone()))
                }
                SubmitOutcome::TransportFailed => CheckoutState::Failed(CheckoutFailure::Transport),
            };
        }
        outcome
    }

    /// Submit inline: `begin_submit`, the gateway call, then `finish_submit`.
    pub async fn submit<G: OrderGateway>(
        &mut self,
        cart: &mut CartManager,
        gateway: &G,
    ) -> Result<SubmitOutcome, CheckoutError> {
        let request = self.begin_submit(cart.cart())?;
        let result = gateway.place_order(&request).await;
        Ok(self.finish_submit(result, cart))
    }

    /// Close the dialog. No effect on the cart; an in-flight submission
    /// keeps the double-submit guard armed until it is finished.
    pub fn close_summary(&mut self) {
        self.state = CheckoutState::Idle;
        self.summary = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::cart::store::tests::MemoryStore;
    use crate::cart::store::CART_KEY;
    use crate::cart::CartStore;
    use crate::models::{PrasadamItem, TempleType};

    struct FakeGateway {
        answer: fn() -> anyhow::Result<OrderResponse>,
        calls: AtomicUsize,
    }

    impl FakeGateway {
        fn new(answer: fn() -> anyhow::Result<OrderResponse>) -> Self {
            Self {
                answer,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl OrderGateway for FakeGateway {
        async fn place_order(&self, _order: &OrderRequest) -> anyhow::Result<OrderResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.answer)()
        }
    }

    fn accepted() -> anyhow::Result<OrderResponse> {
        Ok(OrderResponse {
            success: true,
            order_id: Some("7".to_string()),
            error: None,
            message: None,
        })
    }

    fn rejected() -> anyhow::Result<OrderResponse> {
        Ok(OrderResponse {
            success: false,
            order_id: None,
            error: Some("Item out of stock".to_string()),
            message: None,
        })
    }

    fn unreachable() -> anyhow::Result<OrderResponse> {
        Err(anyhow::anyhow!("connection refused"))
    }

    fn item(id: i64, price: f64) -> PrasadamItem {
        PrasadamItem {
            id,
            name: format!("Prasad {}", id),
            description: String::new(),
            price,
            temple_id: Some(1),
            temple_name: "Somnath Temple".to_string(),
            temple_type: TempleType::Jyotirlinga,
        }
    }

    fn filled_cart() -> (CartManager, MemoryStore) {
        let memory = MemoryStore::default();
        let mut cart = CartManager::load(CartStore::new(Box::new(memory.clone())));
        cart.add_item(&item(1, 50.0), 2).unwrap();
        cart.add_item(&item(2, 30.0), 1).unwrap();
        (cart, memory)
    }

    fn ready_checkout(cart: &CartManager) -> CheckoutCoordinator {
        let mut checkout = CheckoutCoordinator::new();
        assert!(checkout.open_summary(cart.cart()));
        let form = checkout.form_mut();
        form.name = "Asha".to_string();
        form.email = "asha@example.org".to_string();
        form.phone = "9876543210".to_string();
        form.address = "12 Temple Road, Pune".to_string();
        checkout
    }

    // ------------------------------------------------------------------------
    // Opening
    // ------------------------------------------------------------------------

    #[test]
    fn test_open_summary_on_empty_cart_is_noop() {
        let mut checkout = CheckoutCoordinator::new();
        assert!(!checkout.open_summary(&Cart::new()));
        assert_eq!(checkout.state(), &CheckoutState::Idle);
        assert!(checkout.summary().is_none());
    }

    #[test]
    fn test_open_summary_snapshots_cart() {
        let (cart, _) = filled_cart();
        let mut checkout = CheckoutCoordinator::new();
        assert!(checkout.open_summary(cart.cart()));
        let summary = checkout.summary().unwrap();
        assert_eq!(summary.lines.len(), 2);
        assert_eq!(summary.lines[0].line_total, 100.0);
        assert_eq!(summary.total, 130.0);
        assert!(matches!(checkout.state(), CheckoutState::SummaryOpen(_)));
    }

    // ------------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------------

    #[test]
    fn test_begin_submit_requires_open_dialog() {
        let (cart, _) = filled_cart();
        let mut checkout = CheckoutCoordinator::new();
        assert!(matches!(checkout.begin_submit(cart.cart()), Err(CheckoutError::NotOpen)));
    }

    #[test]
    fn test_begin_submit_reports_missing_field() {
        let (cart, _) = filled_cart();
        let mut checkout = ready_checkout(&cart);
        checkout.form_mut().phone = "  ".to_string();
        let err = checkout.begin_submit(cart.cart()).unwrap_err();
        assert!(matches!(err, CheckoutError::MissingField(ContactField::Phone)));
        assert!(!checkout.is_submitting());
    }

    #[test]
    fn test_begin_submit_builds_request() {
        let (cart, _) = filled_cart();
        let mut checkout = ready_checkout(&cart);
        let request = checkout.begin_submit(cart.cart()).unwrap();
        assert_eq!(request.user_name, "Asha");
        assert_eq!(request.total_amount, 130.0);
        assert_eq!(checkout.state(), &CheckoutState::Submitting);
    }

    #[test]
    fn test_double_submit_is_refused() {
        let (cart, _) = filled_cart();
        let mut checkout = ready_checkout(&cart);
        checkout.begin_submit(cart.cart()).unwrap();
        assert!(matches!(
            checkout.begin_submit(cart.cart()),
            Err(CheckoutError::AlreadySubmitting)
        ));
    }

    #[test]
    fn test_guard_survives_close_and_reopen() {
        let (mut cart, _) = filled_cart();
        let mut checkout = ready_checkout(&cart);
        checkout.begin_submit(cart.cart()).unwrap();
        checkout.close_summary();
        assert!(checkout.open_summary(cart.cart()));
        assert!(matches!(
            checkout.begin_submit(cart.cart()),
            Err(CheckoutError::AlreadySubmitting)
        ));

        // Late answer lands while the reopened dialog shows the summary
        let outcome = checkout.finish_submit(accepted(), &mut cart);
        assert!(outcome.is_placed());
        assert!(cart.cart().is_empty());
        assert!(matches!(checkout.state(), CheckoutState::SummaryOpen(_)));
        assert!(!checkout.is_submitting());
    }

    // ------------------------------------------------------------------------
    // Finishing
    // ------------------------------------------------------------------------

    #[test]
    fn test_success_clears_cart_and_form() {
        let (mut cart, memory) = filled_cart();
        let mut checkout = ready_checkout(&cart);
        checkout.begin_submit(cart.cart()).unwrap();

        let outcome = checkout.finish_submit(accepted(), &mut cart);
        assert_eq!(
            outcome,
            SubmitOutcome::Placed { order_id: Some("7".to_string()), cart_saved: true }
        );
        assert_eq!(outcome.message(), "Order placed successfully! Your order ID is: 7");
        assert!(cart.cart().is_empty());
        assert_eq!(memory.slots.lock().unwrap().get(CART_KEY).map(String::as_str), Some("[]"));
        assert_eq!(checkout.form(), &ContactDetails::default());
        assert_eq!(
            checkout.state(),
            &CheckoutState::Succeeded { order_id: Some("7".to_string()) }
        );
        assert!(checkout.summary().is_none());
    }

    #[test]
    fn test_rejection_leaves_cart_untouched() {
        let (mut cart, memory) = filled_cart();
        let before_cart = serde_json::to_string(cart.cart()).unwrap();
        let before_slot = memory.slots.lock().unwrap().get(CART_KEY).cloned();
        let mut checkout = ready_checkout(&cart);
        checkout.begin_submit(cart.cart()).unwrap();

        let outcome = checkout.finish_submit(rejected(), &mut cart);
        assert_eq!(outcome.message(), "Failed to place order: Item out of stock");
        assert_eq!(serde_json::to_string(cart.cart()).unwrap(), before_cart);
        assert_eq!(memory.slots.lock().unwrap().get(CART_KEY).cloned(), before_slot);
        assert_eq!(
            checkout.state(),
            &CheckoutState::Failed(CheckoutFailure::Rejected("Item out of stock".to_string()))
        );
        assert_eq!(checkout.form().name, "Asha");
    }

    #[test]
    fn test_transport_failure_allows_retry() {
        let (mut cart, _) = filled_cart();
        let mut checkout = ready_checkout(&cart);
        checkout.begin_submit(cart.cart()).unwrap();

        let outcome = checkout.finish_submit(unreachable(), &mut cart);
        assert_eq!(outcome.message(), TRANSPORT_FAILURE_MESSAGE);
        assert_eq!(checkout.state(), &CheckoutState::Failed(CheckoutFailure::Transport));
        assert_eq!(cart.total_item_count(), 3);
        assert!(checkout.summary().is_some());

        assert!(checkout.begin_submit(cart.cart()).is_ok());
    }

    #[test]
    fn test_close_summary_has_no_cart_effect() {
        let (cart, _) = filled_cart();
        let mut checkout = ready_checkout(&cart);
        checkout.close_summary();
        assert_eq!(checkout.state(), &CheckoutState::Idle);
        assert_eq!(cart.total_item_count(), 3);
        assert_eq!(checkout.form().name, "Asha");
    }

    // ------------------------------------------------------------------------
    // Inline submit
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_submit_through_gateway() {
        let (mut cart, _) = filled_cart();
        let mut checkout = ready_checkout(&cart);
        let gateway = FakeGateway::new(accepted);

        let outcome = checkout.submit(&mut cart, &gateway).await.unwrap();
        assert!(outcome.is_placed());
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
        assert!(cart.cart().is_empty());
    }

    #[tokio::test]
    async fn test_submit_with_missing_field_never_calls_gateway() {
        let (mut cart, _) = filled_cart();
        let mut checkout = ready_checkout(&cart);
        checkout.form_mut().email.clear();
        let gateway = FakeGateway::new(accepted);

        let err = checkout.submit(&mut cart, &gateway).await.unwrap_err();
        assert!(matches!(err, CheckoutError::MissingField(ContactField::Email)));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }
}
