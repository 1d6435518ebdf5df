//! Pipermail pages and mock-server helpers shared by the integration tests

use mailman_mirror::config::{parse_config, ArchiveConfig};
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const LIST_PATH: &str = "/pipermail/members";

/// Knobs for a test configuration
pub struct Options {
    pub feed: bool,
    pub items_for_rss: usize,
    pub hours_to_go_back: u64,
    pub credentials: Option<(&'static str, &'static str)>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            feed: true,
            items_for_rss: 10,
            hours_to_go_back: 0,
            credentials: None,
        }
    }
}

/// Builds a configuration pointing at the mock server
pub fn test_config(server: &MockServer, publish_dir: &Path, options: Options) -> ArchiveConfig {
    let (email, password) = options.credentials.unwrap_or(("", ""));
    let rss_file = if options.feed {
        publish_dir.join("feed.xml").display().to_string()
    } else {
        String::new()
    };

    parse_config(&format!(
        r#"
[mailman]
email = {email:?}
password = {password:?}
domain = "{domain}"
list-name = "members"
user-agent = "mailman-mirror-tests"

[conversion]
filter-email-addresses = true
list-info-url = "https://www.example.com/join/"
strip-quotes = 1

[rss]
rss-file = {rss_file:?}
items-for-rss = {items}
rss-title = "Members"
rss-description = "Latest messages to the members list"

[local]
publish-dir = {publish_dir:?}
publish-url = "https://www.example.com/members/"
hours-to-go-back = {hours}
message-delay-ms = 0
"#,
        email = email,
        password = password,
        domain = server.address(),
        rss_file = rss_file,
        items = options.items_for_rss,
        publish_dir = publish_dir.display().to_string(),
        hours = options.hours_to_go_back,
    ))
    .expect("test config should parse")
}

/// `2009-February` -> `February 2009:`
fn month_label(month: &str) -> String {
    let (year, name) = month.split_once('-').expect("month is <year>-<Month>");
    format!("{} {}:", name, year)
}

/// The top-level archive index listing the given months
pub fn index_page(months: &[&str]) -> String {
    let rows: String = months
        .iter()
        .map(|month| {
            format!(
                r#"
  <tr>
    <td>{label}</td>
    <td><A href="{month}/thread.html">[ Thread ]</a>
        <A href="{month}/date.html">[ Date ]</a></td>
    <td><A href="{month}.txt.gz">[ Gzip'd Text 2 KB ]</a></td>
  </tr>"#,
                label = month_label(month),
                month = month
            )
        })
        .collect();

    format!(
        r##"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 3.2//EN">
<HTML>
  <HEAD>
    <title>The Members Archives</title>
  </HEAD>
  <BODY BGCOLOR="#ffffff">
    <h1>The Members Archives</h1>
    <p>You can get <a href="/mailman/listinfo/members">more information about this list</a>.</p>
    <table border=3>
      <tr><td>Archive</td><td>View by:</td><td>Downloadable version</td></tr>{rows}
    </table>
  </BODY>
</HTML>
"##,
        rows = rows
    )
}

/// A month's date view listing messages in document (ascending) order
pub fn date_page(month: &str, files: &[&str]) -> String {
    let items: String = files
        .iter()
        .map(|file| {
            format!(
                "<LI><A HREF=\"{file}\">[Members] Message {file}\n</A><A NAME=\"{file}\">&nbsp;</A>\n<I>Ann Example\n</I>\n",
                file = file
            )
        })
        .collect();

    format!(
        r##"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 3.2//EN">
<HTML>
  <HEAD>
     <title>The Members {month} Archive by date</title>
  </HEAD>
  <BODY BGCOLOR="#ffffff">
      <a name="start"></A>
      <h1>{month} Archives by date</h1>
      <ul>
         <li> <b>Messages sorted by:</b>
              <a href="thread.html#start">[ thread ]</a>
              <a href="subject.html#start">[ subject ]</a>
              <a href="author.html#start">[ author ]</a>
         </li>
      </ul>
      <p><b>Messages:</b> {count}<p>
     <ul>
{items}
    </ul>
    <p>
      <a name="end"><b>Last message date:</b></a>
    </p>
    <ul>
      <li> <b>Messages sorted by:</b>
        <a href="thread.html#start">[ thread ]</a>
      </li>
    </ul>
  </BODY>
</HTML>
"##,
        month = month,
        count = files.len(),
        items = items
    )
}

/// A single message page in pipermail's layout
pub fn message_page(subject: &str, date: &str, body: &str) -> String {
    format!(
        r##"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 3.2//EN">
<HTML>
 <HEAD>
   <TITLE> [Members] {subject}
   </TITLE>
   <LINK REL="Index" HREF="index.html" >
 </HEAD>
 <BODY BGCOLOR="#ffffff">
   <H1>[Members] {subject}</H1>
    <B>Ann Example</B>
    <A HREF="mailto:members%40lists.example.com?Subject=%5BMembers%5D%20{subject}"
       TITLE="[Members] {subject}">ann at example.com
       </A><BR>
    <I>{date}</I>
    <P><UL>
        <LI>Previous message: <A HREF="000000.html">[Members] Earlier</A></li>
        <LI> <B>Messages sorted by:</B>
              <a href="date.html#start">[ date ]</a>
        </LI>
    </UL>
    <HR>
<!--beginarticle-->
<PRE>{body}
</PRE>
<!--endarticle-->
    <HR>
    <P><UL>
        <LI>More information about the <a href="http://lists.example.com/mailman/listinfo/members">Members
mailing list</a><br>
    </UL>
</body></html>
"##,
        subject = subject,
        date = date,
        body = body
    )
}

/// Mounts a GET route answering with an HTML body
pub async fn mount_page(server: &MockServer, route: &str, body: String, expected: Option<u64>) {
    let mock = Mock::given(method("GET"))
        .and(path(route.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body));
    match expected {
        Some(times) => mock.expect(times).mount(server).await,
        None => mock.mount(server).await,
    }
}

/// Mounts a GET route answering with raw bytes
pub async fn mount_bytes(server: &MockServer, route: &str, body: Vec<u8>, expected: Option<u64>) {
    let mock = Mock::given(method("GET"))
        .and(path(route.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body));
    match expected {
        Some(times) => mock.expect(times).mount(server).await,
        None => mock.mount(server).await,
    }
}

/// Mounts a month: its date view, its messages and its auxiliary views
///
/// `messages` are (file, page) pairs in ascending order. `aux_expected` is the
/// number of times each auxiliary view must be requested.
pub async fn mount_month(
    server: &MockServer,
    month: &str,
    messages: &[(&str, String)],
    aux_expected: u64,
) {
    let files: Vec<&str> = messages.iter().map(|(file, _)| *file).collect();
    mount_page(
        server,
        &format!("{}/{}/date.html", LIST_PATH, month),
        date_page(month, &files),
        None,
    )
    .await;

    for (file, page) in messages {
        mount_page(
            server,
            &format!("{}/{}/{}", LIST_PATH, month, file),
            page.clone(),
            None,
        )
        .await;
    }

    for view in ["thread", "subject", "author"] {
        mount_page(
            server,
            &format!("{}/{}/{}.html", LIST_PATH, month, view),
            format!("<html><head></head><body><h1>{} by {}</h1></body></html>", month, view),
            Some(aux_expected),
        )
        .await;
    }

    mount_bytes(
        server,
        &format!("{}/{}.txt.gz", LIST_PATH, month),
        gzip_stub(month),
        Some(aux_expected),
    )
    .await;
}

/// Bytes standing in for a month's gzipped text archive
pub fn gzip_stub(month: &str) -> Vec<u8> {
    let mut bytes = vec![0x1f, 0x8b, 0x08, 0x00];
    bytes.extend_from_slice(month.as_bytes());
    bytes
}
