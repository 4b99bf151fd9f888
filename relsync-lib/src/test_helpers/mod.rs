pub mod mock_release_client;
