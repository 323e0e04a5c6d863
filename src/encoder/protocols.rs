//! Per-protocol URL builders.
//!
//! Each builder assumes the baseline required fields were already checked
//! and only handles optional parts and protocol-specific rules.

use super::fields::FieldReader;

fn push_segments(url: &mut String, segments: &[String]) {
    for segment in segments {
        url.push('/');
        url.push_str(segment);
    }
}

fn push_port(url: &mut String, port: Option<String>) {
    if let Some(port) = port {
        url.push(':');
        url.push_str(&port);
    }
}

pub(super) fn email(f: &FieldReader<'_>) -> Option<String> {
    let mut url = format!(
        "mailtos://{}:{}@{}",
        f.scalar("user")?,
        f.scalar("password")?,
        f.scalar("domain")?
    );
    push_port(&mut url, f.scalar("port"));

    let mut params = Vec::new();
    if let Some(smtp) = f.scalar("smtp") {
        params.push(format!("smtp={smtp}"));
    }
    if let Some(from) = f.scalar("from") {
        params.push(format!("from={from}"));
    }
    for key in ["to", "cc", "bcc"] {
        let recipients = f.list(key);
        if !recipients.is_empty() {
            params.push(format!("{key}={}", recipients.join(",")));
        }
    }

    if !params.is_empty() {
        url.push('?');
        url.push_str(&params.join("&"));
    }
    Some(url)
}

pub(super) fn fcm(f: &FieldReader<'_>) -> Option<String> {
    let devices = f.list("devices");
    if devices.is_empty() {
        return None;
    }
    Some(format!("fcm://{}/{}", f.scalar("apiKey")?, devices.join("/")))
}

pub(super) fn google_chat(f: &FieldReader<'_>) -> Option<String> {
    Some(format!(
        "gchat://{}/{}/{}",
        f.scalar("workspace")?,
        f.scalar("webhookKey")?,
        f.scalar("webhookToken")?
    ))
}

pub(super) fn jira(f: &FieldReader<'_>) -> Option<String> {
    let mut url = format!("jira://{}", f.scalar("apiKey")?);
    push_segments(&mut url, &f.list("targets"));
    Some(url)
}

pub(super) fn matrix(f: &FieldReader<'_>) -> Option<String> {
    let alias = f.scalar("roomAlias")?;
    let room = if alias.starts_with('#') || alias.starts_with('!') {
        alias
    } else {
        format!("#{alias}")
    };
    Some(format!(
        "matrix://{}:{}@{}/{}",
        f.scalar("user")?,
        f.scalar("password")?,
        f.scalar("hostname")?,
        room
    ))
}

pub(super) fn mastodon(f: &FieldReader<'_>) -> Option<String> {
    let mut url = format!("mastodons://{}@{}", f.scalar("token")?, f.scalar("host")?);
    push_segments(&mut url, &f.list("targets"));
    Some(url)
}

pub(super) fn mattermost(f: &FieldReader<'_>) -> Option<String> {
    let hostname = f.scalar("hostname")?;
    let token = f.scalar("token")?;

    let mut url = String::from("mmost://");
    if let Some(botname) = f.scalar("botname") {
        url.push_str(&botname);
        url.push('@');
    }
    url.push_str(&hostname);
    push_port(&mut url, f.scalar("port"));
    url.push('/');
    url.push_str(&token);
    if let Some(channel) = f.scalar("channel") {
        url.push('/');
        url.push_str(&channel);
    }
    Some(url)
}

pub(super) fn ms_teams(f: &FieldReader<'_>) -> Option<String> {
    Some(format!(
        "msteams://{}/{}/{}/{}",
        f.scalar("team")?,
        f.scalar("tokenA")?,
        f.scalar("tokenB")?,
        f.scalar("tokenC")?
    ))
}

pub(super) fn nextcloud_talk(f: &FieldReader<'_>) -> Option<String> {
    let mut url = format!(
        "nctalk://{}:{}@{}",
        f.scalar("user")?,
        f.scalar("password")?,
        f.scalar("hostname")?
    );
    push_port(&mut url, f.scalar("port"));
    url.push('/');
    url.push_str(&f.scalar("roomId")?);
    Some(url)
}

/// Webhook credentials win; otherwise user and password are both needed.
pub(super) fn rocket_chat(f: &FieldReader<'_>) -> Option<String> {
    let hostname = f.scalar("hostname")?;
    let targets = f.list("targets");
    if targets.is_empty() {
        return None;
    }

    let credentials = match f.scalar("webhook") {
        Some(webhook) => webhook,
        None => format!("{}:{}", f.scalar("user")?, f.scalar("password")?),
    };

    let mut url = format!("rocket://{credentials}@{hostname}");
    push_segments(&mut url, &targets);
    Some(url)
}

pub(super) fn signal(f: &FieldReader<'_>) -> Option<String> {
    let mut url = format!(
        "signal://{}:{}@{}/{}",
        f.scalar("user")?,
        f.scalar("password")?,
        f.scalar("hostname")?,
        f.scalar("fromPhone")?
    );
    push_segments(&mut url, &f.list("targets"));
    Some(url)
}

pub(super) fn slack(f: &FieldReader<'_>) -> Option<String> {
    Some(format!(
        "slack://{}/{}/{}",
        f.scalar("tokenA")?,
        f.scalar("tokenB")?,
        f.scalar("tokenC")?
    ))
}

pub(super) fn smtp2go(f: &FieldReader<'_>) -> Option<String> {
    let mut url = format!(
        "smtp2go://{}@{}/{}",
        f.scalar("user")?,
        f.scalar("domain")?,
        f.scalar("apiKey")?
    );
    push_segments(&mut url, &f.list("to"));
    Some(url)
}

pub(super) fn telegram(f: &FieldReader<'_>) -> Option<String> {
    let mut url = format!("tgram://{}", f.scalar("botToken")?);
    push_segments(&mut url, &f.list("chatIds"));
    Some(url)
}

pub(super) fn whatsapp(f: &FieldReader<'_>) -> Option<String> {
    let mut url = format!("whatsapp://{}@{}", f.scalar("token")?, f.scalar("fromPhoneId")?);
    push_segments(&mut url, &f.list("targets"));
    Some(url)
}

pub(super) fn zulip(f: &FieldReader<'_>) -> Option<String> {
    let mut url = format!(
        "zulip://{}@{}/{}",
        f.scalar("botname")?,
        f.scalar("organization")?,
        f.scalar("token")?
    );
    push_segments(&mut url, &f.list("targets"));
    Some(url)
}

pub(super) fn discord(f: &FieldReader<'_>) -> Option<String> {
    Some(format!(
        "discord://{}/{}",
        f.scalar("webhookId")?,
        f.scalar("webhookToken")?
    ))
}

pub(super) fn passthrough(f: &FieldReader<'_>) -> Option<String> {
    f.scalar("url")
}
