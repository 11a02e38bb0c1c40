//! Native file dialogs for opening and saving documents

pub mod dialogs;
