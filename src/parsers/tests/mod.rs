mod locator_chain_tests;
