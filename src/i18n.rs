// i18n.rs — 运行时界面文字
//
// - 文字位于 assets/i18n/<lang>.json，或单文件 assets/i18n.json
//   (格式: { "<lang>": { "key": "value" } })
// - 查找顺序：当前语言 -> 回退 en -> key 本身
// - tr("key") / tr_with("key", &[("name", ...)]) 替换 {name} 占位符
//
// 语言选择：配置 lang / --lang，其次 PANORAMA_LANG，默认 en

use once_cell::sync::OnceCell;
use panorama_view::config::locate;
use std::{collections::HashMap, path::Path, sync::RwLock};

pub const FALLBACK_LANG: &str = "en";

type Catalog = HashMap<String, String>;

#[derive(Debug, Clone, Default)]
struct I18n {
    lang: String,
    map: Catalog,
    fallback_map: Catalog,
}

static I18N: OnceCell<RwLock<I18n>> = OnceCell::new();

fn parse_single(text: &str) -> Option<Catalog> {
    serde_json::from_str(text).ok()
}

fn parse_multi(text: &str, lang: &str) -> Option<Catalog> {
    let mut all: HashMap<String, Catalog> = serde_json::from_str(text).ok()?;
    all.remove(lang)
}

fn load_lang(lang: &str) -> Catalog {
    let per_lang = Path::new("assets").join("i18n").join(format!("{lang}.json"));
    if let Some(m) = locate(&per_lang)
        .and_then(|p| std::fs::read_to_string(p).ok())
        .and_then(|t| parse_single(&t))
    {
        return m;
    }

    let multi = Path::new("assets").join("i18n.json");
    locate(&multi)
        .and_then(|p| std::fs::read_to_string(p).ok())
        .and_then(|t| parse_multi(&t, lang))
        .unwrap_or_default()
}

/// Initialize global i18n. Later calls switch the language.
pub fn init(lang: impl Into<String>) {
    let lang = lang.into();
    let map = load_lang(&lang);
    let fallback_map = if lang == FALLBACK_LANG {
        map.clone()
    } else {
        load_lang(FALLBACK_LANG)
    };
    log::debug!("i18n: {lang} ({} keys)", map.len());

    let i = I18n { lang, map, fallback_map };
    match I18N.get() {
        Some(lock) => {
            if let Ok(mut w) = lock.write() {
                *w = i;
            }
        }
        None => {
            let _ = I18N.set(RwLock::new(i));
        }
    }
}

pub fn current_lang() -> String {
    I18N.get()
        .and_then(|l| l.read().ok().map(|i| i.lang.clone()))
        .unwrap_or_else(|| FALLBACK_LANG.to_string())
}

fn lookup(i: &I18n, key: &str) -> String {
    i.map
        .get(key)
        .or_else(|| i.fallback_map.get(key))
        .cloned()
        .unwrap_or_else(|| key.to_string())
}

pub fn tr(key: &str) -> String {
    match I18N.get().and_then(|l| l.read().ok()) {
        Some(i) => lookup(&i, key),
        None => key.to_string(),
    }
}

fn substitute(mut s: String, args: &[(&str, String)]) -> String {
    for (k, v) in args {
        s = s.replace(&format!("{{{k}}}"), v);
    }
    s
}

/// Localized text with `{name}` placeholders filled; unknown ones stay.
pub fn tr_with(key: &str, args: &[(&str, String)]) -> String {
    substitute(tr(key), args)
}

pub fn resolve_lang(configured: Option<&str>) -> String {
    if let Some(l) = configured.filter(|l| !l.trim().is_empty()) {
        return l.to_string();
    }
    match std::env::var("PANORAMA_LANG") {
        Ok(v) if !v.trim().is_empty() => v,
        _ => FALLBACK_LANG.to_string(),
    }
}
