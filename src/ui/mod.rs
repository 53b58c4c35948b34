/// egui rendering of the dashboard state.
pub mod charts;
pub mod panels;
pub mod table;
