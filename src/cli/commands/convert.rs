//! Convert command implementation.
//!
//! One-shot converter front-end for previewing how a ticket body will read
//! after migration: BBCode in (file or stdin), Markdown out (stdout).

use std::fs;
use std::io::Read;

use crate::bbcode::BbcodeConverter;
use crate::cli::ConvertArgs;
use crate::config;
use crate::error::Result;

/// Exercise document for --selftest: one instance of every construct the
/// converter rewrites.
const SELFTEST_DOCUMENT: &str = "
Some text. [b]Some bold text[/b]. [i]Some italic text[/i].

These tags should all get stripped:
[u]Some underlined text (no matching markdown)[/u].
[color=blue]This text used to be blue. It's not now.[/color]
[highlight=yellow]This was highlighted in the BBCode, but not in the Markdown.[/highlight]
[sup]This was superscript, but is not now.[/sup]
[sub]This was subscript, but is not now.[/sub]
[left]This was left-aligned, but is not now.[/left]
[center]This was centered, but is not now.[/center]
[right]This was right-aligned, but is not now.[/right]
[justify]This was justified, but is not now.[/justify]

Size is special:
[size=125]This is a heading[/size]
[size=100]This is just plain text, the size has been stripped.[/size]
[size=125]This is also plain text[/size], because it's not on its own line.

Lists:
[list]
[*] This is a bullet point in an unordered list
[*] This is a second bullet point in an unordered list
[/list]
[list=2]
[*] This is a bullet point in an ordered list, starting from item 2
[*] This is a second bullet point in an ordered list, but numbered 3
[/list]

Code:
This is a chunk of text containing [code]A little bit of code[/code].
[code]
This is some real code, in a block
[/code]
[code=top_sekrit_language]
Markdown does not care what language the code is in
[/code]

Quotes:
[quote=\"some guy\"]
Markdown does not care who the quote is by, or when it happened
[/quote]
";

/// Execute the convert command.
///
/// # Errors
///
/// Returns an error if the username map or the input cannot be read.
pub fn execute(args: &ConvertArgs) -> Result<()> {
    let usernames = config::load_map(args.user_map.as_deref())?;
    let converter = BbcodeConverter::with_username_map(usernames);

    let text = if args.selftest {
        SELFTEST_DOCUMENT.to_string()
    } else if let Some(path) = &args.input {
        fs::read_to_string(path)?
    } else {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    };

    print!("{}", converter.convert(&text));
    Ok(())
}
