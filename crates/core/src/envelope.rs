use crate::types::{ActionId, FrameIndex};

#[derive(Clone, Debug)]
pub struct ActionEnvelope<A> {
    pub action_id: ActionId,
    pub intended_frame: FrameIndex,
    pub payload: A,
}
