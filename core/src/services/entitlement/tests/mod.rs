mod engine_tests;
