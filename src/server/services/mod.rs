pub mod edge_services;
pub mod video_info_services;

pub use video_info_services::DynVideoInfoService;
