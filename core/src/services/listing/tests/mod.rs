mod view_cache_tests;
