// studio - AI portrait variation wizard

pub mod ui;
pub mod wizard;
