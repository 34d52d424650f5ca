//! Domain - ドメインモデル（ids, descriptor, message, state, outcome, errors）

pub mod descriptor;
pub mod errors;
pub mod ids;
pub mod message;
pub mod outcome;
pub mod state;

pub use descriptor::SubscriptionDescriptor;
pub use errors::{
    AttemptError, CallbackError, ExecutorError, RegistrationError, StoreError, SubscriberError,
    ThresholdError,
};
pub use ids::MessageId;
pub use message::{MessageContext, MessageEnvelope, MessageType};
pub use outcome::{CallbackDirective, HandlerReply, OperateResult};
pub use state::MessageState;
