pub mod mock_channel;
pub mod prepare_env;
