use crate::core::{FragmentSink, FragmentSource};
use crate::utils::error::{CheckoutError, Result};
use regex::{Captures, Regex};
use reqwest::Client;
use std::sync::LazyLock;
use url::Url;

static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="([^"]*)""#).expect("valid href regex"));

/// 一個要注入頁面的 HTML 片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentSpec {
    pub path: String,
    /// 目標容器的 id
    pub container: String,
}

impl FragmentSpec {
    pub fn new(path: &str, container: &str) -> Self {
        Self {
            path: path.to_string(),
            container: container.to_string(),
        }
    }
}

/// 把片段內以網站根目錄為基準的連結，改寫成子目錄頁面可用的相對連結
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRewriter {
    nested_dir: String,
    root_prefix: String,
}

impl LinkRewriter {
    pub fn new(nested_dir: &str, root_prefix: &str) -> Self {
        Self {
            nested_dir: nested_dir.to_string(),
            root_prefix: root_prefix.to_string(),
        }
    }

    pub fn is_nested_page(&self, page_path: &str) -> bool {
        let page_path = page_path.trim_start_matches('/');
        page_path.starts_with(&self.nested_dir) || page_path.contains(&format!("/{}", self.nested_dir))
    }

    pub fn rewrite(&self, html: &str) -> String {
        HREF_RE
            .replace_all(html, |caps: &Captures| {
                format!("href=\"{}\"", self.rewrite_href(&caps[1]))
            })
            .into_owned()
    }

    fn rewrite_href(&self, href: &str) -> String {
        let external = ["http", "#", "mailto:", "tel:", "/"]
            .iter()
            .any(|prefix| href.starts_with(prefix));
        if href.is_empty() || external {
            return href.to_string();
        }

        if let Some(local) = href.strip_prefix(self.nested_dir.as_str()) {
            return local.to_string();
        }

        if href.starts_with("../") || href.contains("pages/") {
            return href.to_string();
        }

        format!("{}{}", self.root_prefix, href)
    }
}

impl Default for LinkRewriter {
    fn default() -> Self {
        Self::new("assets/pages/", "../../")
    }
}

/// 以 HTTP 從網站根目錄取得片段
#[derive(Debug, Clone)]
pub struct HttpFragmentSource {
    client: Client,
    base_url: Url,
}

impl HttpFragmentSource {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: Client::new(),
            base_url: Url::parse(base_url)?,
        })
    }
}

#[async_trait::async_trait]
impl FragmentSource for HttpFragmentSource {
    async fn fetch(&self, path: &str) -> Result<String> {
        let url = self.base_url.join(path)?;
        tracing::debug!("Fetching fragment: {}", url);

        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(CheckoutError::FragmentStatusError {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChromeReport {
    pub loaded: Vec<String>,
    pub failed: Vec<String>,
}

impl ChromeReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// 載入頁首與頁尾；失敗只記錄，不中斷頁面
pub struct FragmentLoader<S: FragmentSource> {
    source: S,
    header: FragmentSpec,
    footer: FragmentSpec,
    rewriter: LinkRewriter,
}

impl<S: FragmentSource> FragmentLoader<S> {
    pub fn new(source: S, header: FragmentSpec, footer: FragmentSpec, rewriter: LinkRewriter) -> Self {
        Self {
            source,
            header,
            footer,
            rewriter,
        }
    }

    /// 取得並改寫單一片段，不注入
    pub async fn render(&self, spec: &FragmentSpec, page_path: &str) -> Result<String> {
        let html = self.source.fetch(&spec.path).await?;
        if self.rewriter.is_nested_page(page_path) {
            Ok(self.rewriter.rewrite(&html))
        } else {
            Ok(html)
        }
    }

    pub async fn load_page_chrome<K: FragmentSink>(&self, page_path: &str, sink: &K) -> ChromeReport {
        let (header, footer) = tokio::join!(
            self.load_into(&self.header, page_path, sink),
            self.load_into(&self.footer, page_path, sink)
        );

        let mut report = ChromeReport::default();
        for (spec, ok) in [(&self.header, header), (&self.footer, footer)] {
            if ok {
                report.loaded.push(spec.container.clone());
            } else {
                report.failed.push(spec.container.clone());
            }
        }
        report
    }

    async fn load_into<K: FragmentSink>(&self, spec: &FragmentSpec, page_path: &str, sink: &K) -> bool {
        match self.render(spec, page_path).await {
            Ok(html) => {
                sink.inject(&spec.container, &html);
                tracing::info!("📄 Loaded {} into #{}", spec.path, spec.container);
                true
            }
            Err(e) => {
                tracing::error!("❌ Error loading {} into #{}: {}", spec.path, spec.container, e);
                false
            }
        }
    }
}
