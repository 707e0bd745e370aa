pub mod video_info_dto;
