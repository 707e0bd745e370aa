/// upstream properties the relay will fetch from. the cdn list is known to be incomplete, which
/// is what the brand substrings below are for
pub const ALLOWED_HOST_SUFFIXES: [&str; 10] = [
    "cctv.com",
    "cntv.cn",
    "cctvpic.com",
    "lxdns.com",
    "cdn20.com",
    "chinanetcenter.com",
    "cloudcdn.net",
    "myalicdn.com",
    "myqcloud.com",
    "cdnpe.com",
];

pub const TRUSTED_BRAND_MARKERS: [&str; 2] = ["cntv", "cctv"];

/// plain `ends_with`, not a label-aware suffix match. `notcctv.com` passes and so does anything
/// with a brand marker anywhere in it
pub fn is_allowed_host(host: &str) -> bool {
    ALLOWED_HOST_SUFFIXES
        .iter()
        .any(|suffix| host.ends_with(suffix))
        || TRUSTED_BRAND_MARKERS
            .iter()
            .any(|marker| host.contains(marker))
}
