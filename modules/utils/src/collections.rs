/// Queue backends shared by the reactive operator core.
pub mod queue;
