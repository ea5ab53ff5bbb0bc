//! cellgraph_engine - Positions, values, formulas and cycle detection.

pub mod engine;
