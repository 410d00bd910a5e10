//! Initialize a blog in the current directory.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing folio...");

    scaffold(config_path, Path::new("content/blog"), yes)?;

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'folio dev' to start the development server.");

    Ok(())
}

/// Write the config file and sample posts. Existing files are kept unless
/// `overwrite` is set.
fn scaffold(config_path: &Path, content_dir: &Path, overwrite: bool) -> Result<()> {
    if !content_dir.exists() {
        fs::create_dir_all(content_dir).context("Failed to create content directory")?;
    }

    let config = DEFAULT_CONFIG.replace("{content_dir}", &content_dir.to_string_lossy());
    write_if_allowed(config_path, &config, overwrite)?;

    for (name, body) in SAMPLE_POSTS {
        write_if_allowed(&content_dir.join(name), body, overwrite)?;
    }

    Ok(())
}

fn write_if_allowed(path: &Path, content: &str, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        tracing::warn!("{} already exists. Use --yes to overwrite.", path.display());
        return Ok(());
    }

    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Created {}", path.display());
    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Folio Configuration

[content]
# Directory holding posts
dir = "{content_dir}"
extensions = ["mdx"]
words_per_minute = 200

[site]
title = "DevLaunch"
description = "Technical articles and tutorials about web development"
# Base URL (for deployment under a sub-path)
base_url = "/"

[build]
output = "dist"
minify = true

[server]
host = "127.0.0.1"
port = 3000
# Seconds a rendered page is served before it is rebuilt
revalidate_secs = 600
prerender = true
"#;

const SAMPLE_POSTS: [(&str, &str); 2] = [
    ("hello-world.mdx", HELLO_WORLD),
    ("writing-posts.mdx", WRITING_POSTS),
];

const HELLO_WORLD: &str = r#"---
title: Hello World
description: The first post on this blog.
date: 2024-01-15
author: Folio
tags: [announcements]
---

# Hello World

Welcome to your new blog. Posts live in `content/blog` as `.mdx` files.

## What's next

Read [Writing Posts](/blog/writing-posts/) to learn the post format.
"#;

const WRITING_POSTS: &str = r#"---
title: Writing Posts
description: Frontmatter fields, code blocks and tags.
date: 2024-01-20
author: Folio
tags: [guides, markdown]
---

# Writing Posts

Every post starts with frontmatter:

```yaml
title: My Post
description: One line summary
date: 2024-01-20
author: Your Name
tags: [rust, web]
```

## Code blocks

Fenced code is highlighted by language:

```rust
fn main() {
    println!("Hello from folio");
}
```

## Tags

Each tag gets its own listing page under `/blog/tags/`.
"#;
