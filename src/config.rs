#[derive(clap::ValueEnum, Clone, Debug, Copy)]
pub enum CargoEnv {
    Development,
    Production,
}

#[derive(clap::Parser, Clone, Debug)]
pub struct AppConfig {
    // production or development
    #[clap(long, env, value_enum)]
    pub cargo_env: CargoEnv,

    // port that the app will bind to
    #[clap(long, env, default_value = "5000")]
    pub port: u16,

    // origin that serves the day index and the video pages. only worth changing when pointing
    // the pipeline at a local mock
    #[clap(long, env, default_value = "https://tv.cctv.com")]
    pub site_origin: String,

    // metadata api that turns a guid into the hls url
    #[clap(
        long,
        env,
        default_value = "https://vdn.apps.cntv.cn/api/getHttpVideoInfo.do"
    )]
    pub video_info_api: String,

    // optional sentry integration
    #[clap(long, env)]
    pub sentry_dsn: Option<String>,
}

impl Default for AppConfig {
    // mirrors the clap defaults so tests can build a config without touching the env
    fn default() -> Self {
        Self {
            cargo_env: CargoEnv::Development,
            port: 5000,
            site_origin: "https://tv.cctv.com".to_string(),
            video_info_api: "https://vdn.apps.cntv.cn/api/getHttpVideoInfo.do".to_string(),
            sentry_dsn: None,
        }
    }
}
