//! The instruction sent alongside the user's question.

/// Column description of the bundled `pokemon.csv` sample.
pub const POKEMON_SCHEMA: &str = r#"[{"id":10000,"hint":"","name":"Name","type":"Text"},{"id":"10001","hint":"","name":"Type 1","type":"Text"},{"id":"10002","hint":"","name":"Type 2","type":"Text"},{"id":"10004","hint":"","name":"Total","type":"Digit"},{"id":"10005","hint":"","name":"HP","type":"Digit"},{"id":"10006","hint":"","name":"Attack","type":"Digit"},{"id":"10007","hint":"","name":"Defense","type":"Digit"},{"id":"10009","hint":"","name":"Sp. Atk","type":"Digit"},{"id":"10010","hint":"","name":"Sp. Def","type":"Digit"},{"id":"10011","hint":"","name":"Generation","type":"Digit"},{"id":"10012","hint":"","name":"Legendary","type":"Single Select","config":{"enableOtherOption":false},"options":["True","False"]}]"#;

const SQL_DIRECTIVE: &str = r#", translate the query into a sql, and reply as follows:
{"sql": "sql"}
Example:
{"sql": "select count(*) from pokemon where generation=1;"}

If you do not know the answer, reply as follows:
{"answer": "I do not know."}

Return all output as a string.

Lets think step by step.

Below is the query.
Query:
"#;

const CHART_DIRECTIVE: &str = r#"
For the following query, if it requires drawing a table, reply as follows:
{"table": {"columns": ["column1", "column2", ...], "data": [[value1, value2, ...], [value1, value2, ...], ...]}}

If the query requires creating a bar chart, reply as follows:
{"bar": {"columns": ["A", "B", "C", ...], "data": [25, 24, 10, ...]}}

If the query requires creating a line chart, reply as follows:
{"line": {"columns": ["A", "B", "C", ...], "data": [25, 24, 10, ...]}}

There can only be two types of chart, "bar" and "line".

If it is just asking a question that requires neither, reply as follows:
{"answer": "answer"}
Example:
{"answer": "The title with the highest rating is 'Gilead'"}

If you do not know the answer, reply as follows:
{"answer": "I do not know."}

Return all output as a string.

All strings in "columns" list and data list, should be in double quotes,

For example: {"columns": ["title", "ratings_count"], "data": [["Gilead", 361], ["Spider's Web", 5164]]}

Lets think step by step.

Below is the query.
Query:
"#;

const PLOT_DIRECTIVE: &str = r#"
If the query asks for a list of items, respond in this format where words are placed in quotes and numbers are not:
"LIST ["item_1", "item_2", number_1, number_2, etc]"

If the query asks for a line graph between two variables, respond in this format where x and y don't change:
"LINE data={[{x: value_1, y: value_2}, {x: value_3, y: value_4}, etc]}"

If the query asks for a scatter plot between two variables, respond in this format where x and y don't change and size is defaulted to 1,
but if there is a third variable, change the size variable to that value:
"SCATTER data={[{x: value_1, y: value_2, size: 1}, {x: value_3, y: value_4, size: 1}, etc]}"

If the query asks to plot a bar graph, respond in this format where x and y don't change:
"BAR1 data={[{x: "category_1", y: value_1}, {x: "category_2", y: value_2}, etc]}
BAR2 data={[{x: "category_1", y: value_1}, {x: "category_2", y: value_2}, etc]}"
If the query asks to plot a bar graph with multiple categories across two variables, repeat the above format for those categories.

If the query asks to plot a pie chart, respond in this format:
"PIE data={[{angle: value_1}, {angle: value_2}, etc]}"
where each angle is its respective percent of 2 pi radians

Otherwise, answer as needed.

The following is the question: "#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    /// Translate the question into SQL over the given column schema.
    Sql { schema: String },
    /// Answer as a table, a bar/line chart, or a plain answer object.
    Chart,
    /// Keyword-prefixed plot lines (`LIST`, `LINE`, `SCATTER`, `BAR1`, `PIE`).
    Plot,
    /// No format directive; the question goes out verbatim.
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    pub question: String,
    pub format: OutputFormat,
}

impl QueryConfig {
    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = question.into();
        self
    }

    pub fn render(&self) -> String {
        match &self.format {
            OutputFormat::Sql { schema } => format!(
                "\nFor database schema as '{schema}'{SQL_DIRECTIVE}{}",
                self.question
            ),
            OutputFormat::Chart => format!("{CHART_DIRECTIVE}{}", self.question),
            OutputFormat::Plot => format!("{PLOT_DIRECTIVE}{}", self.question),
            OutputFormat::Plain => self.question.clone(),
        }
    }
}
