pub mod chart_service;
pub mod price_service;

#[cfg(test)]
pub mod test_helpers;
