use crate::dialect::{Dialect, FlagClass};
use crate::job::Operation;

/// Flags ready to be laid out, defaults first.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct MergedFlags {
    pub flags: Vec<String>,
    /// The caller chose where output goes, so the builder must not add its own.
    pub caller_output: bool,
}

#[derive(Debug)]
struct Group<'a> {
    tokens: Vec<&'a str>,
    class: Option<FlagClass>,
}

impl Group<'_> {
    fn head(&self) -> &str {
        self.tokens[0]
    }
}

/// Split tokens into options and the values they consume.
fn group<'a>(
    dialect: Dialect,
    operation: Operation,
    tokens: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<Group<'a>>, String> {
    let mut tokens = tokens.into_iter();
    let mut groups = Vec::new();
    while let Some(token) = tokens.next() {
        let classified = dialect.classify(operation, token);
        let mut group = Group {
            tokens: vec![token],
            class: classified.map(|(class, _)| class),
        };
        if let Some((_, true)) = classified {
            let value = tokens
                .next()
                .ok_or_else(|| format!("option {token} expects a value"))?;
            group.tokens.push(value);
        }
        groups.push(group);
    }
    Ok(groups)
}

/// Combine a tool's default flags with the caller's.
///
/// Caller flags always survive, in order, after the defaults. A default is dropped when
/// the caller repeats it or passes another flag of the same class. A caller flag that
/// would switch the tool into the other mode cannot be honoured and is reported.
pub(crate) fn merge(
    dialect: Dialect,
    operation: Operation,
    defaults: &[&str],
    caller: &[String],
) -> Result<MergedFlags, String> {
    let caller = group(dialect, operation, caller.iter().map(String::as_str))?;
    if let Some(bad) = caller
        .iter()
        .find(|g| dialect.contradicts(operation, g.head()))
    {
        return Err(format!(
            "flag {} would make the tool do something other than {operation}",
            bad.head()
        ));
    }

    let defaults = group(dialect, operation, defaults.iter().copied())?;
    let mut flags = Vec::new();
    for default in &defaults {
        let overridden = caller.iter().any(|c| {
            c.head() == default.head() || (c.class.is_some() && c.class == default.class)
        });
        if !overridden {
            flags.extend(default.tokens.iter().map(|t| t.to_string()));
        }
    }
    flags.extend(
        caller
            .iter()
            .flat_map(|g| g.tokens.iter().map(|t| t.to_string())),
    );

    Ok(MergedFlags {
        flags,
        caller_output: caller.iter().any(|g| g.class == Some(FlagClass::Output)),
    })
}
