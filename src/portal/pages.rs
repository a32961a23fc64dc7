//! HTML pages served by the portal

use std::fmt::Write;

use crate::models::CardType;
use crate::models::Post;

pub const LOGIN_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Twiq Portal - Login</title></head>
<body>
<h1>Twiq Portal</h1>
<form method="post" action="/login">
  <label>Phone <input type="text" name="Phone" required></label><br>
  <label>Password <input type="password" name="Password" required></label><br>
  <button type="submit">Login</button>
</form>
</body>
</html>
"#;

pub const SUCCESS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Twiq Portal - Done</title></head>
<body>
<h1>Done</h1>
<p><a href="/list">Back to posts</a></p>
</body>
</html>
"#;

pub const ERROR_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Twiq Portal - Error</title></head>
<body>
<h1>Something went wrong</h1>
<p><a href="/list">Back to posts</a> or <a href="/login">log in again</a></p>
</body>
</html>
"#;

const CREATE_FORM: &str = r#"<h2>New post</h2>
<form method="post" action="/create" enctype="multipart/form-data">
  <label>Image <input type="file" name="image" required></label><br>
  <label>Card type
    <select name="CardType">
      <option value="0">Image</option>
      <option value="1">Article</option>
      <option value="2">Gif</option>
    </select>
  </label><br>
  <label>Profile image URL <input type="text" name="DpSrc"></label><br>
  <label>Title <input type="text" name="Title"></label><br>
  <label>Description <textarea name="Description"></textarea></label><br>
  <label>Button text <input type="text" name="ButtonText"></label><br>
  <label>Url <input type="text" name="Url"></label><br>
  <button type="submit">Create</button>
</form>
"#;

/// Escape text for use in element content and quoted attributes
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn card_label(card_type: i32) -> String {
    match CardType::from_i32(card_type) {
        Some(CardType::Image) => "Image".to_string(),
        Some(CardType::Article) => "Article".to_string(),
        Some(CardType::Gif) => "Gif".to_string(),
        Some(CardType::DateSeparator) => "Date separator".to_string(),
        Some(CardType::List) => "List".to_string(),
        None => card_type.to_string(),
    }
}

/// Post table with per-row link and delete forms, followed by the upload form
#[must_use]
pub fn render_list(posts: &[Post]) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Twiq Portal - Posts</title></head>\n<body>\n\
         <p><a href=\"/logout\">Logout</a></p>\n<h1>Posts</h1>\n",
    );

    if posts.is_empty() {
        html.push_str("<p>No posts yet.</p>\n");
    } else {
        html.push_str(
            "<table border=\"1\">\n<tr><th>Id</th><th>Title</th><th>Card</th><th>Link</th><th>Delete</th></tr>\n",
        );
        for post in posts {
            let id = escape_html(&post.id);
            // Writing into a String cannot fail
            let _ = write!(
                html,
                "<tr><td>{id}</td><td>{title}</td><td>{card}</td>\
                 <td><form method=\"post\" action=\"/postlink\">\
                 <input type=\"hidden\" name=\"PostId\" value=\"{id}\">\
                 <input type=\"number\" name=\"MascotId\" value=\"1\" min=\"1\">\
                 <button type=\"submit\">Link</button></form></td>\
                 <td><form method=\"post\" action=\"/delete\">\
                 <input type=\"hidden\" name=\"PostId\" value=\"{id}\">\
                 <button type=\"submit\">Delete</button></form></td></tr>\n",
                title = escape_html(&post.title),
                card = escape_html(&card_label(post.card_type)),
            );
        }
        html.push_str("</table>\n");
    }

    html.push_str(CREATE_FORM);
    html.push_str("</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_render_list_escapes_titles() {
        let posts = vec![Post {
            id: "65a1b2c3d4e5f60718293a4b".to_string(),
            title: "<script>alert(1)</script>".to_string(),
            card_type: 1,
            ..Post::default()
        }];
        let html = render_list(&posts);
        assert!(html.contains("65a1b2c3d4e5f60718293a4b"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("<td>Article</td>"));
        assert!(html.contains("action=\"/delete\""));
    }

    #[test]
    fn test_render_empty_list_still_offers_upload() {
        let html = render_list(&[]);
        assert!(html.contains("No posts yet."));
        assert!(html.contains("enctype=\"multipart/form-data\""));
    }

    #[test]
    fn test_unknown_card_type_is_shown_as_number() {
        assert_eq!(card_label(42), "42");
        assert_eq!(card_label(4), "List");
    }
}
