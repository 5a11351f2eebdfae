pub use self::{combatant::*, element::*, moves::*, type_chart::*};

mod combatant;
mod element;
mod moves;
mod type_chart;
