pub mod proxy_controller;
pub mod static_controller;
pub mod video_info_controller;
