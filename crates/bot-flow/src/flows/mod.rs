// Archivo: flows/mod.rs
// Propósito: procesadores de entrada y prompts por estado, separados por
// flujo. Cada módulo extiende `ChatEngine` con los handlers de su pipeline.
pub mod express;
pub mod report;
pub mod search;
