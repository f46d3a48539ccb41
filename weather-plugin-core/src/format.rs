use std::fmt::{self, Write};

use tracing::warn;

use crate::model::{WeatherFields, labels};

const UNKNOWN: &str = "未知";

/// Renders the chat reply for parsed fields.
///
/// `requested_city` stands in when the upstream did not name the city. Never
/// fails: a rendering error yields a short fallback sentence instead.
pub fn format_reply(requested_city: &str, fields: &WeatherFields) -> String {
    let mut out = String::new();
    match render(&mut out, requested_city, fields) {
        Ok(()) => out,
        Err(err) => {
            warn!(error = %err, city = requested_city, "failed to render weather reply");
            fallback(requested_city)
        }
    }
}

/// Writes the reply template into `out`. No trailing newline.
pub fn render<W: Write>(out: &mut W, requested_city: &str, fields: &WeatherFields) -> fmt::Result {
    let city = fields.get(labels::CITY).unwrap_or(requested_city);
    let weather = fields.get(labels::WEATHER).unwrap_or(UNKNOWN);
    let temperature = fields.get(labels::TEMPERATURE).unwrap_or(UNKNOWN);
    let updated_at = fields.get(labels::UPDATED_AT).unwrap_or(UNKNOWN);
    let location = fields.get(labels::DETAIL_LOCATION).unwrap_or_default();

    writeln!(out, "🌤️ {city}天气信息")?;
    if !location.is_empty() {
        writeln!(out, "📍 位置: {location}")?;
    }
    writeln!(out, "🌡️ 气温: {temperature}")?;
    writeln!(out, "☁️ 天气: {weather}")?;
    write!(out, "🕒 更新: {updated_at}")
}

pub fn fallback(requested_city: &str) -> String {
    format!("{requested_city}的天气信息获取成功，但格式解析异常。")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shanghai(with_location: bool) -> WeatherFields {
        let mut fields: WeatherFields = [
            (labels::CITY, "上海"),
            (labels::WEATHER, "多云"),
            (labels::TEMPERATURE, "20℃"),
            (labels::UPDATED_AT, "08:00"),
        ]
        .into_iter()
        .collect();
        if with_location {
            fields.insert(labels::DETAIL_LOCATION, "浦东");
        }
        fields
    }

    #[test]
    fn full_reply_includes_location() {
        let reply = format_reply("上海", &shanghai(true));
        assert_eq!(
            reply,
            "🌤️ 上海天气信息\n📍 位置: 浦东\n🌡️ 气温: 20℃\n☁️ 天气: 多云\n🕒 更新: 08:00"
        );
    }

    #[test]
    fn location_line_omitted_when_absent() {
        let reply = format_reply("上海", &shanghai(false));
        assert!(!reply.contains("📍"));
        assert_eq!(reply.lines().count(), 4);
    }

    #[test]
    fn location_line_omitted_when_empty() {
        let mut fields = shanghai(false);
        fields.insert(labels::DETAIL_LOCATION, "");
        assert!(!format_reply("上海", &fields).contains("位置"));
    }

    #[test]
    fn missing_fields_fall_back() {
        let fields: WeatherFields = [("风向", "北风")].into_iter().collect();
        let reply = format_reply("杭州", &fields);

        assert!(reply.starts_with("🌤️ 杭州天气信息\n"));
        assert!(reply.contains("🌡️ 气温: 未知"));
        assert!(reply.contains("☁️ 天气: 未知"));
        assert!(reply.ends_with("🕒 更新: 未知"));
    }

    #[test]
    fn upstream_city_name_wins_over_request() {
        let reply = format_reply("shanghai", &shanghai(false));
        assert!(reply.starts_with("🌤️ 上海天气信息"));
    }

    #[test]
    fn no_trailing_newline() {
        assert!(!format_reply("上海", &shanghai(true)).ends_with('\n'));
    }

    struct Broken;

    impl Write for Broken {
        fn write_str(&mut self, _: &str) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn render_propagates_writer_errors() {
        assert!(render(&mut Broken, "上海", &shanghai(true)).is_err());
    }

    #[test]
    fn fallback_names_requested_city() {
        assert_eq!(fallback("成都"), "成都的天气信息获取成功，但格式解析异常。");
    }
}
