//! Application state container.
//!
//! All mutations go through [`reduce`], a pure function from the current
//! state and an [`Action`] to the next state plus the storage [`Effect`] the
//! change requires. [`AppStore`] owns the state and carries out the effects.

mod store;

use milk_delivery_core::{Cart, CartItem, CartItemId, UserProfile};

pub use store::{AppStore, CART_KEY};

/// Everything the app keeps in memory between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    /// Signed-in user, if any.
    pub user: Option<UserProfile>,
    pub cart: Cart,
}

/// State transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetUser(UserProfile),
    ClearUser,
    AddToCart { item: CartItem, quantity: u32 },
    RemoveFromCart(CartItemId),
    /// Set a line to an absolute quantity; `0` removes it.
    UpdateQuantity { id: CartItemId, quantity: u32 },
    ClearCart,
    /// Replace the cart with a snapshot restored from storage.
    RestoreCart(Cart),
}

/// Storage work required after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    PersistCart,
    RemoveCart,
}

/// Apply `action` to `state`.
#[must_use]
pub fn reduce(state: &mut AppState, action: Action) -> Effect {
    match action {
        Action::SetUser(user) => {
            state.user = Some(user);
            Effect::None
        }
        Action::ClearUser => {
            state.user = None;
            Effect::None
        }
        Action::AddToCart { item, quantity } => persist_if(state.cart.add_line(item, quantity)),
        Action::RemoveFromCart(id) => persist_if(state.cart.remove_line(&id)),
        Action::UpdateQuantity { id, quantity } => {
            persist_if(state.cart.set_quantity(&id, quantity))
        }
        Action::ClearCart => {
            if state.cart.clear() {
                Effect::RemoveCart
            } else {
                Effect::None
            }
        }
        Action::RestoreCart(cart) => {
            state.cart = cart.normalized();
            Effect::None
        }
    }
}

const fn persist_if(changed: bool) -> Effect {
    if changed {
        Effect::PersistCart
    } else {
        Effect::None
    }
}
