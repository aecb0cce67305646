//! Dashboard URL helpers / 仪表盘 URL 工具
//!
//! The dashboard may be mounted under a base path (`http://host/dash`).
//! Every endpoint is appended to that path, never resolved against it.
//! 仪表盘可能挂载在子路径下，所有端点都追加在该路径之后。

use anyhow::Context;
use reqwest::Url;

/// Parse `dashboard_url`, rejecting URLs that cannot carry a path.
pub(crate) fn parse_base(dashboard_url: &str) -> anyhow::Result<Url> {
    let base = Url::parse(dashboard_url)
        .with_context(|| format!("invalid dashboard url: {dashboard_url}"))?;
    if base.cannot_be_a_base() {
        anyhow::bail!("dashboard url cannot carry paths: {dashboard_url}");
    }
    Ok(base)
}

/// Append percent-encoded `segments` to the base path.
pub(crate) fn extend(base: &Url, segments: &[&str]) -> anyhow::Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("dashboard url cannot carry paths: {base}"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Resolve a server-provided path. Relative and root-relative paths land
/// under the base path; absolute URLs are kept as they are.
pub(crate) fn resolve(base: &Url, path: &str) -> anyhow::Result<Url> {
    let mut dir = base.clone();
    if !dir.path().ends_with('/') {
        let with_slash = format!("{}/", dir.path());
        dir.set_path(&with_slash);
    }
    dir.join(path.trim_start_matches('/'))
        .with_context(|| format!("bad dashboard path: {path}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extend_keeps_base_path() {
        let base = parse_base("http://host:6052/dash").unwrap();
        assert_eq!(
            extend(&base, &["ping"]).unwrap().as_str(),
            "http://host:6052/dash/ping"
        );

        let root = parse_base("http://host:6052").unwrap();
        assert_eq!(
            extend(&root, &["configurations", "living room"]).unwrap().as_str(),
            "http://host:6052/configurations/living%20room"
        );
    }

    #[test]
    fn resolve_places_paths_under_base() {
        let base = parse_base("http://host/dash").unwrap();
        assert_eq!(
            resolve(&base, "/builds/kitchen/firmware.bin").unwrap().as_str(),
            "http://host/dash/builds/kitchen/firmware.bin"
        );
        assert_eq!(
            resolve(&base, "builds/firmware.bin").unwrap().as_str(),
            "http://host/dash/builds/firmware.bin"
        );

        let trailing = parse_base("http://host/dash/").unwrap();
        assert_eq!(
            resolve(&trailing, "/ota.bin").unwrap().as_str(),
            "http://host/dash/ota.bin"
        );
    }

    #[test]
    fn resolve_keeps_absolute_urls() {
        let base = parse_base("http://host/dash").unwrap();
        assert_eq!(
            resolve(&base, "https://cdn.example.com/fw.bin").unwrap().as_str(),
            "https://cdn.example.com/fw.bin"
        );
    }

    #[test]
    fn rejects_non_base_url() {
        assert!(parse_base("mailto:dashboard@example.com").is_err());
    }
}
