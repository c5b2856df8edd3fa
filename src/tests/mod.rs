pub mod test_edge_cases;
pub mod test_optimizer;
