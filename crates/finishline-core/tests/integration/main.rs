mod fallback_tests;
mod scenario_tests;
