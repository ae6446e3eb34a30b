pub mod message_bus;
pub mod session;

pub use message_bus::{ListenerGuard, MessageBus};
pub use session::{EditorSession, LaunchContext, SessionDeps, SessionHandle};
