pub mod bing_api;
pub mod html;
