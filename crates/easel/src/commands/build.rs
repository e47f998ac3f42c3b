//! Build command - Compile a snippet into an HTML document

use clap::Args;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use easel::atelier::{CompileError, SnippetCompiler};
use easel::config::EaselConfig;
use easel::vitrine::{render, RenderOptions, RenderedSnippet, APP_CSS, APP_JS};

use super::load_or_exit;

#[derive(Args)]
pub struct BuildArgs {
    /// Snippet file (.json, .yaml or .yml)
    pub input: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = "./dist")]
    pub output: PathBuf,

    /// Embed CSS and JS into index.html instead of writing app.css and app.js
    #[arg(long)]
    pub inline: bool,

    /// Do not wrap code in the host runtime's initialize callback
    #[arg(long)]
    pub no_host_wrapper: bool,
}

impl BuildArgs {
    fn render_options(&self, defaults: &RenderOptions) -> RenderOptions {
        let mut options = defaults.clone();
        if self.inline {
            options.inline_js_and_css_into_iframe = true;
        }
        if self.no_host_wrapper {
            options.include_host_initialize_wrapper = false;
        }
        options
    }
}

pub fn run(args: BuildArgs, config: &EaselConfig) {
    let start = Instant::now();
    let snippet = load_or_exit(&args.input);

    let compiler = SnippetCompiler::new(config.compiler.clone());
    let compiled = match compiler.compile(Some(&snippet)) {
        Ok(compiled) => compiled,
        Err(CompileError::Diagnostics(report)) => {
            eprintln!("{}\n", report);
            eprintln!(
                "\x1b[31mFailed to compile {}\x1b[0m ({} error(s))",
                args.input.display(),
                report.len()
            );
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("\x1b[31mError compiling {}:\x1b[0m {}", args.input.display(), e);
            std::process::exit(1);
        }
    };

    let rendered = render(&compiled, &args.render_options(&config.render));
    let written = match write_document(&args.output, &rendered) {
        Ok(written) => written,
        Err(e) => {
            eprintln!("Failed to write {}: {}", args.output.display(), e);
            std::process::exit(1);
        }
    };

    for path in &written {
        eprintln!("  {}", path.display());
    }
    if let Some(host_runtime) = &rendered.host_runtime_reference {
        eprintln!("  host runtime: {}", host_runtime);
    }
    eprintln!(
        "\x1b[32m✓\x1b[0m Built {} in {:.4}s",
        args.input.display(),
        start.elapsed().as_secs_f64()
    );
}

/// Write `index.html` and, in external-file mode, `app.css` and `app.js`.
fn write_document(dir: &Path, rendered: &RenderedSnippet) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let mut files = vec![(dir.join("index.html"), rendered.html.as_str())];
    if let Some(external) = &rendered.external_files {
        files.push((dir.join(APP_CSS), external.app_css.as_str()));
        files.push((dir.join(APP_JS), external.app_js.as_str()));
    }

    let mut written = Vec::with_capacity(files.len());
    for (path, content) in files {
        let mut content = content.to_string();
        content.push('\n');
        fs::write(&path, content)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel::vitrine::ExternalFiles;

    fn args(inline: bool, no_host_wrapper: bool) -> BuildArgs {
        BuildArgs {
            input: PathBuf::from("snippet.yaml"),
            output: PathBuf::from("./dist"),
            inline,
            no_host_wrapper,
        }
    }

    #[test]
    fn test_flags_override_config() {
        let defaults = RenderOptions {
            runner_chrome: true,
            ..Default::default()
        };

        let options = args(true, true).render_options(&defaults);
        assert!(options.inline_js_and_css_into_iframe);
        assert!(!options.include_host_initialize_wrapper);
        assert!(options.runner_chrome);

        let options = args(false, false).render_options(&RenderOptions::inline());
        assert!(options.inline_js_and_css_into_iframe);
        assert!(options.include_host_initialize_wrapper);
    }

    #[test]
    fn test_write_external_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("dist");
        let rendered = RenderedSnippet {
            html: "<!DOCTYPE html>".into(),
            host_runtime_reference: None,
            external_files: Some(ExternalFiles {
                app_css: "body {}".into(),
                app_js: "run();".into(),
            }),
        };

        let written = write_document(&out, &rendered).unwrap();
        assert_eq!(written.len(), 3);
        assert_eq!(fs::read_to_string(out.join("index.html")).unwrap(), "<!DOCTYPE html>\n");
        assert_eq!(fs::read_to_string(out.join("app.js")).unwrap(), "run();\n");
    }

    #[test]
    fn test_write_inline_document() {
        let dir = tempfile::tempdir().unwrap();
        let rendered = RenderedSnippet {
            html: "<html></html>".into(),
            host_runtime_reference: None,
            external_files: None,
        };

        let written = write_document(dir.path(), &rendered).unwrap();
        assert_eq!(written, [dir.path().join("index.html")]);
        assert!(!dir.path().join("app.css").exists());
    }
}
