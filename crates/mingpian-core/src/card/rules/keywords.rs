//! Keyword lists used by the field classifiers.
//!
//! Chinese keywords are listed in both Traditional and Simplified forms.

/// Job titles and roles.
pub const POSITION_KEYWORDS: &[&str] = &[
    "經理", "经理", "總監", "总监", "主任", "專員", "专员", "工程師", "工程师",
    "設計師", "设计师", "分析師", "分析师", "顧問", "顾问", "助理", "主管",
    "總經理", "总经理", "副總", "副总", "協理", "协理", "襄理", "課長", "课长",
    "組長", "组长", "部長", "部长", "處長", "处长", "會計", "会计", "董事長",
    "董事长", "執行長", "执行长", "特助",
    "CEO", "CTO", "CFO", "COO", "Manager", "Director", "Engineer", "Designer",
    "Analyst", "Consultant", "Assistant", "Supervisor", "Lead", "Senior",
    "Junior", "Finance", "President", "Specialist", "Accountant",
];

/// Company suffixes and sector words.
pub const COMPANY_KEYWORDS: &[&str] = &[
    "有限公司", "股份有限公司", "公司", "企業", "企业", "集團", "集团", "科技",
    "資訊", "资讯", "工業", "工业", "貿易", "贸易", "實業", "实业", "銀行", "银行",
    "事務所", "事务所",
    "Ltd", "Inc", "Corp", "Co.", "Company", "Technology", "Technologies",
    "Systems", "Group", "Enterprise", "Industries", "Solutions", "Services",
    "International", "Bank", "TAXI", "Taxi", "Studio", "Labs",
];

/// Localities and road words.
pub const ADDRESS_KEYWORDS: &[&str] = &[
    "台北", "臺北", "新北", "台中", "臺中", "台南", "臺南", "高雄", "桃園", "桃园",
    "新竹", "基隆", "市", "區", "区", "路", "街", "號", "号", "樓", "楼", "巷", "弄",
    "縣", "县",
    "Road", "Rd.", "Street", "Ave", "Avenue", "Taiwan", "Taipei", "Floor", "No.",
    "Sec.", "Dist.",
];

/// Website markers, matched case-insensitively.
pub const WEBSITE_KEYWORDS: &[&str] = &[
    "www.", ".com", ".tw", ".org", ".net", ".gov", "http://", "https://",
];

/// Words that rule a text out as a personal name.
pub const BUSINESS_TERMS: &[&str] = &[
    "有限公司", "股份", "企業", "企业", "Ltd", "Inc", "Corp", "經理", "经理",
    "總監", "总监", "工程師", "工程师", "TAXI", "LINE", "Finance", "會計", "会计",
    "專員", "专员", "資深", "资深", "推薦", "推荐", "序號", "序号",
];

/// Context words marking a fax line (lowercase).
pub const FAX_CONTEXT: &[&str] = &["fax", "傳真", "传真"];

/// Context words marking an office line (lowercase).
///
/// A plain "Tel" label says nothing about the line type and is not listed.
pub const WORK_CONTEXT: &[&str] = &["work", "office", "公司", "工作", "辦公", "办公", "總機", "总机"];

/// Labels that introduce a phone number of any type (lowercase).
pub const PHONE_LABELS: &[&str] = &[
    "tel", "phone", "mobile", "cell", "fax", "電話", "电话", "手機", "手机", "傳真", "传真",
];

/// Check if `text` contains any keyword from `list`.
pub fn contains_any(text: &str, list: &[&str]) -> bool {
    list.iter().any(|k| text.contains(k))
}

/// Like [`contains_any`], but an ASCII keyword only counts as a whole word.
///
/// `fax` matches `Fax:` and `FAX02...` but not `Fairfax`; CJK keywords match
/// anywhere.
pub fn contains_label(text: &str, list: &[&str]) -> bool {
    list.iter().any(|keyword| {
        if !keyword.is_ascii() {
            return text.contains(keyword);
        }

        text.match_indices(keyword).any(|(start, matched)| {
            let before = text[..start].chars().next_back();
            let after = text[start + matched.len()..].chars().next();
            !before.is_some_and(|c| c.is_ascii_alphabetic())
                && !after.is_some_and(|c| c.is_ascii_alphabetic())
        })
    })
}

/// Labels printed before a business-registration number.
pub const COMPANY_ID_MARKERS: &[&str] = &["統一編號", "统一编号", "統編", "统编"];
