pub mod auth;
pub mod billing;
pub mod common;
pub mod configuration;
pub mod protected;
pub mod storage;
pub mod system_module;
pub mod ui_form;
pub mod validator;
